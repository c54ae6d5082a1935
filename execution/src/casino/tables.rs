//! Bones multiplier table.
//!
//! Indexed by `[trap_count - 1][depth - 1]` for a 25-tile grid. Each row runs
//! until every safe tile is revealed. Values carry a 97% return to player and
//! are floored to two decimals.

#[rustfmt::skip]
pub(crate) const BONES_MULTIPLIERS: [&[f64]; 24] = [
    // 1 trap
    &[1.01, 1.05, 1.10, 1.15, 1.21, 1.27, 1.34, 1.42, 1.51, 1.61, 1.73, 1.86, 2.02, 2.20, 2.42, 2.69, 3.03, 3.46, 4.04, 4.85, 6.06, 8.08, 12.12, 24.25],
    // 2 traps
    &[1.05, 1.15, 1.25, 1.38, 1.53, 1.70, 1.90, 2.13, 2.42, 2.77, 3.19, 3.73, 4.40, 5.29, 6.46, 8.08, 10.39, 13.85, 19.40, 29.10, 48.50, 97.00, 291.00],
    // 3 traps
    &[1.10, 1.25, 1.44, 1.67, 1.95, 2.30, 2.73, 3.28, 3.98, 4.90, 6.12, 7.80, 10.14, 13.52, 18.59, 26.55, 39.83, 63.74, 111.55, 223.10, 557.75, 2231.00],
    // 4 traps
    &[1.15, 1.38, 1.67, 2.05, 2.53, 3.16, 4.00, 5.15, 6.74, 8.98, 12.25, 17.16, 24.78, 37.18, 58.43, 97.38, 175.29, 350.58, 818.03, 2454.10, 12270.50],
    // 5 traps
    &[1.21, 1.53, 1.95, 2.53, 3.32, 4.43, 6.01, 8.32, 11.79, 17.16, 25.74, 40.04, 65.07, 111.55, 204.50, 409.01, 920.28, 2454.10, 8589.35, 51536.10],
    // 6 traps
    &[1.27, 1.70, 2.30, 3.16, 4.43, 6.33, 9.25, 13.88, 21.45, 34.32, 57.20, 100.10, 185.91, 371.83, 818.03, 2045.08, 6135.25, 24541.00, 171787.00],
    // 7 traps
    &[1.34, 1.90, 2.73, 4.00, 6.01, 9.25, 14.65, 23.97, 40.75, 72.45, 135.86, 271.72, 588.73, 1412.96, 3885.65, 12952.19, 58284.87, 466279.00],
    // 8 traps
    &[1.42, 2.13, 3.28, 5.15, 8.32, 13.88, 23.97, 43.15, 81.51, 163.03, 349.35, 815.17, 2119.45, 6358.35, 23313.95, 116569.75, 1049127.75],
    // 9 traps
    &[1.51, 2.42, 3.98, 6.74, 11.79, 21.45, 40.75, 81.51, 173.22, 395.94, 989.85, 2771.58, 9007.66, 36030.65, 198168.57, 1981685.75],
    // 10 traps
    &[1.61, 2.77, 4.90, 8.98, 17.16, 34.32, 72.45, 163.03, 395.94, 1055.84, 3167.52, 11086.35, 48040.86, 288245.20, 3170697.20],
    // 11 traps
    &[1.73, 3.19, 6.12, 12.25, 25.74, 57.20, 135.86, 349.35, 989.85, 3167.52, 11878.23, 55431.76, 360306.50, 4323678.00],
    // 12 traps
    &[1.86, 3.73, 7.80, 17.16, 40.04, 100.10, 271.72, 815.17, 2771.58, 11086.35, 55431.76, 388022.38, 5044291.00],
    // 13 traps
    &[2.02, 4.40, 10.14, 24.78, 65.07, 185.91, 588.73, 2119.45, 9007.66, 48040.86, 360306.50, 5044291.00],
    // 14 traps
    &[2.20, 5.29, 13.52, 37.18, 111.55, 371.83, 1412.96, 6358.35, 36030.65, 288245.19, 4323678.00],
    // 15 traps
    &[2.42, 6.46, 18.59, 58.43, 204.50, 818.03, 3885.65, 23313.95, 198168.57, 3170697.20],
    // 16 traps
    &[2.69, 8.08, 26.55, 97.38, 409.01, 2045.08, 12952.19, 116569.75, 1981685.75],
    // 17 traps
    &[3.03, 10.39, 39.83, 175.29, 920.28, 6135.25, 58284.87, 1049127.75],
    // 18 traps
    &[3.46, 13.85, 63.74, 350.58, 2454.10, 24541.00, 466279.00],
    // 19 traps
    &[4.04, 19.40, 111.55, 818.03, 8589.35, 171787.00],
    // 20 traps
    &[4.85, 29.10, 223.10, 2454.10, 51536.10],
    // 21 traps
    &[6.06, 48.50, 557.75, 12270.50],
    // 22 traps
    &[8.08, 97.00, 2231.00],
    // 23 traps
    &[12.12, 291.00],
    // 24 traps
    &[24.25],
];
