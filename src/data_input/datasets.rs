// src/data_input/datasets.rs
//
// Readings recorded in the laboratory sessions. These back the `Default`
// impls of the experiment records in `config.rs`.

// Leslie cube thermistor: resistance (ohm) at 134 °C down to 30 °C, 2 °C steps.
pub const THERMISTOR_RESISTANCE_OHM: [f64; 53] = [
    2041.7, 2157.6, 2281.0, 2412.6, 2553.0, 2702.7, 2862.5, 3033.3, 3215.8, 3411.0, 3619.8,
    3843.4, 4082.9, 4339.7, 4615.1, 4910.7, 5228.1, 5569.3, 5936.1, 6330.8, 6755.9, 7214.0,
    7707.7, 8240.6, 8816.0, 9437.7, 10100.0, 10837.0, 11625.0, 12479.0, 13405.0, 14410.0,
    15502.0, 16689.0, 17980.0, 19386.0, 20919.0, 22590.0, 24415.0, 26409.0, 28590.0, 30976.0,
    33591.0, 36458.0, 39605.0, 43062.0, 46863.0, 51048.0, 55658.0, 60743.0, 66356.0, 72560.0,
    79422.0,
];
pub const THERMISTOR_FIRST_TEMPERATURE_C: f64 = 134.0;
pub const THERMISTOR_STEP_C: f64 = -2.0;

pub const STEINHART_HART_A: f64 = 8.467428050163e-4;
pub const STEINHART_HART_B: f64 = 2.058325204985e-4;
pub const STEINHART_HART_C: f64 = 9.050118014518e-8;

pub const LESLIE_AMBIENT_C: f64 = 23.0;
pub const LESLIE_VOLTMETER_MV: f64 = 0.1;
pub const LESLIE_OHMMETER_KOHM: f64 = 0.01;

pub const LESLIE_FACES: [&str; 4] = ["black", "white", "brushed", "polished"];

// (power setting, thermistor kohm, thermopile mV), black face.
pub const LESLIE_REPEATABILITY: [(&str, f64, [f64; 8]); 4] = [
    ("P9", 2.28, [28.6, 28.7, 28.6, 28.6, 28.6, 28.6, 28.7, 28.6]),
    ("P7", 2.69, [25.7, 25.6, 25.7, 25.6, 25.6, 25.6, 25.5, 25.6]),
    ("P6", 3.76, [21.3, 21.3, 21.3, 21.3, 21.3, 21.2, 21.3, 21.4]),
    ("P5", 6.54, [15.5, 15.5, 15.5, 15.5, 15.4, 15.5, 15.5, 15.5]),
];

// (power setting, thermistor kohm, thermopile mV per face in LESLIE_FACES order).
pub const LESLIE_FACE_READINGS: [(&str, f64, [f64; 4]); 4] = [
    ("P9", 2.18, [28.6, 27.9, 8.9, 1.4]),
    ("P7", 2.75, [25.1, 24.5, 7.8, 1.3]),
    ("P6", 3.87, [20.8, 20.5, 6.5, 1.2]),
    ("P5", 6.60, [15.3, 15.1, 4.7, 0.9]),
];

// Inverse-square bench.
pub const IR_DISTANCES_CM: [f64; 16] = [
    3.0, 3.5, 4.0, 4.5, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0,
];
pub const IR_VOLTAGES_MV: [f64; 16] = [
    92.0, 37.2, 29.7, 23.4, 21.0, 15.5, 11.9, 9.0, 7.4, 6.2, 2.8, 1.4, 0.8, 0.4, 0.1, 0.0,
];
pub const IR_REPEATABILITY_MV: [f64; 8] = [6.2, 6.5, 6.4, 6.4, 6.4, 6.4, 6.4, 6.6];
pub const IR_VOLTMETER_MV: f64 = 0.1;
pub const IR_TAPE_CM: f64 = 0.1;

// Tungsten filament lamp.
pub const LAMP_REFERENCE_RESISTANCE_OHM: f64 = 0.6;
pub const LAMP_AMBIENT_K: f64 = 300.0;
pub const LAMP_VOLTAGES_V: [f64; 11] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0];
pub const LAMP_CURRENTS_A: [f64; 11] = [
    1.18, 1.41, 1.58, 1.75, 1.91, 2.04, 2.17, 2.30, 2.44, 2.55, 2.68,
];
pub const LAMP_RADIANCE_MV: [f64; 11] = [
    1.8, 3.6, 5.9, 8.6, 11.6, 14.9, 16.8, 20.5, 25.5, 29.0, 32.5,
];
pub const LAMP_VOLTMETER_V: f64 = 0.5;
pub const LAMP_AMMETER_A: f64 = 0.01;
pub const LAMP_RADIOMETER_MV: f64 = 0.1;

// Manufacturer table: (R/R300K, T in K, resistivity in µΩ·cm).
pub const TUNGSTEN_TABLE: [(f64, f64, f64); 33] = [
    (1.00, 300.0, 5.65),
    (1.43, 400.0, 8.06),
    (1.87, 500.0, 10.56),
    (2.34, 600.0, 13.23),
    (2.85, 700.0, 16.09),
    (3.36, 800.0, 19.00),
    (3.88, 900.0, 21.94),
    (4.41, 1000.0, 24.93),
    (4.95, 1100.0, 27.94),
    (5.48, 1200.0, 30.98),
    (6.03, 1300.0, 34.08),
    (6.58, 1400.0, 37.19),
    (7.14, 1500.0, 40.36),
    (7.71, 1600.0, 43.55),
    (8.28, 1700.0, 46.78),
    (8.86, 1800.0, 50.05),
    (9.44, 1900.0, 53.35),
    (10.03, 2000.0, 56.67),
    (10.63, 2100.0, 60.06),
    (11.24, 2200.0, 63.48),
    (11.84, 2300.0, 66.91),
    (12.46, 2400.0, 70.39),
    (13.08, 2500.0, 73.91),
    (13.72, 2600.0, 77.49),
    (14.34, 2700.0, 81.04),
    (14.99, 2800.0, 84.70),
    (15.63, 2900.0, 88.33),
    (16.29, 3000.0, 92.04),
    (16.95, 3100.0, 95.76),
    (17.62, 3200.0, 99.54),
    (18.28, 3300.0, 103.3),
    (18.97, 3400.0, 107.2),
    (19.66, 3500.0, 111.1),
];

// Pulse timing: oscilloscope delay (s) against extra path length (m).
pub const PULSE_TIME_OFFSETS_S: [f64; 6] = [208.0e-9, 211.0e-9, 216.0e-9, 221.0e-9, 225.0e-9, 230.0e-9];
pub const PULSE_DISTANCES_M: [f64; 6] = [16.82, 17.82, 18.82, 19.82, 20.82, 21.82];
pub const PULSE_TIMEBASE_S: f64 = 0.1e-9;
pub const PULSE_TAPE_M: f64 = 0.05;
