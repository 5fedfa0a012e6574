//! Fixed magic multipliers and index widths for the sliding-piece tables.
//!
//! Index width per square is the number of hash bits; the table for a
//! square holds `1 << bits` entries.

pub(super) const ROOK_BITS: [u8; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    10,  9,  9,  9,  9,  9, 10, 10,
    11, 10, 10, 10, 10, 11, 11, 11,
];

pub(super) const ROOK_MAGICS: [u64; 64] = [
    0x0080_0110_8462_4000, 0x1440_0310_0020_0141, 0x2080_0820_0480_1000, 0x0100_0409_0010_0020,
    0x0200_0200_1020_0408, 0x0300_0100_0804_0002, 0x0400_2408_1000_a102, 0x0080_0031_0005_4680,
    0x1100_8000_4000_8024, 0x8440_4010_0020_0040, 0x0432_0010_2200_8044, 0x0402_0022_0010_0840,
    0x4024_8080_0800_0400, 0x100a_0004_1082_0008, 0x8042_0011_4402_0028, 0x2451_0000_4100_2082,
    0x1080_0040_0020_0056, 0xd410_10c0_2000_4000, 0x0004_4100_2000_1104, 0x0000_8180_5000_0800,
    0x0000_0500_0801_0010, 0x0230_8080_0200_0400, 0x2000_4400_9002_2108, 0x0488_0200_0081_1044,
    0x8000_4101_0020_8006, 0x2000_a002_4010_0140, 0x2088_8022_0040_1600, 0x0a10_1001_8008_0082,
    0x0000_0801_0011_0004, 0x0021_0023_0008_0400, 0x8400_8804_0001_0230, 0x2001_0082_0000_4401,
    0x0000_4000_2280_0480, 0x0020_0040_e240_1000, 0x4004_1000_8480_2000, 0x0218_8008_0080_1002,
    0x0420_8008_0080_0400, 0x002a_0004_0200_1008, 0x0e0b_0004_0100_8200, 0x0815_9080_7200_0401,
    0x1840_0080_0249_8021, 0x1070_1220_0242_4000, 0x1040_2001_0041_0010, 0x0600_0800_1000_8080,
    0x0215_0010_0801_0004, 0x0000_0200_0400_8080, 0x1300_0210_5104_0018, 0x0004_0400_4082_0001,
    0x48ff_fe99_fecf_aa00, 0x48ff_fe99_fecf_aa00, 0x497f_ffad_ff9c_2e00, 0x613f_ffdd_ffce_9200,
    0xffff_ffe9_ffe7_ce00, 0xffff_fff5_fff3_e600, 0x2000_0802_8110_0400, 0x510f_fff5_f63c_96a0,
    0xebff_ffb9_ff9f_c526, 0x61ff_fedd_feed_aeae, 0x53bf_ffed_ffde_b1a2, 0x127f_ffb9_ffdf_b5f6,
    0x411f_ffdd_ffdb_f4d6, 0x0005_0002_0804_0001, 0x2640_3806_0100_d004, 0x7645_fffe_cbfe_a79e,
];

pub(super) const BISHOP_BITS: [u8; 64] = [
     5,  4,  5,  5,  5,  5,  4,  5,
     4,  4,  5,  5,  5,  5,  4,  4,
     4,  4,  7,  7,  7,  7,  4,  4,
     5,  5,  7,  9,  9,  7,  5,  5,
     5,  5,  7,  9,  9,  7,  5,  5,
     4,  4,  7,  7,  7,  7,  4,  4,
     4,  4,  5,  5,  5,  5,  4,  4,
     5,  4,  5,  5,  5,  5,  4,  5,
];

pub(super) const BISHOP_MAGICS: [u64; 64] = [
    0xffed_f9fd_7cfc_ffff, 0xfc09_6285_4a77_f576, 0x9010_2100_4104_7000, 0x5224_2420_800c_0000,
    0x8844_0422_0480_004a, 0x0002_0802_4800_0802, 0xfc0a_66c6_4a7e_f576, 0x7ffd_fdfc_bd79_ffff,
    0xfc08_46a6_4a34_fff6, 0xfc08_7a87_4a3c_f7f6, 0x0200_0888_010a_2211, 0x0040_0440_4080_1808,
    0x0880_0404_2000_0000, 0x0000_0841_1010_9000, 0xfc08_64ae_59b4_ff76, 0x3c08_60af_4b35_ff76,
    0x73c0_1af5_6cf4_cffb, 0x41a0_1cfa_d64a_affc, 0x1010_0002_0084_1104, 0x8028_0214_2a00_6000,
    0x0a02_0004_1202_0020, 0x0000_8000_4050_4030, 0x7c0c_028f_5b34_ff76, 0xfc0a_028e_5ab4_df76,
    0x0020_0820_4490_5488, 0xa572_2111_0208_0220, 0x0014_0200_0128_0300, 0x0220_2080_5800_8042,
    0x0001_0100_0010_4016, 0x0005_1140_2808_0800, 0x0202_6400_0084_8800, 0x0400_4090_0a00_8421,
    0x400e_0940_0060_0208, 0x800a_1004_0012_0890, 0x0041_2290_0148_0020, 0x0000_0200_8088_0082,
    0x0040_0020_2006_0080, 0x1819_1001_00c0_2400, 0x0411_2a40_82c4_0400, 0x0001_2401_3021_0500,
    0xdcef_d9b5_4bfc_c09f, 0xf95f_fa76_5afd_602b, 0x0082_0022_2800_a410, 0x0100_0201_0240_6400,
    0x80a8_0400_9400_0200, 0x0020_0200_6200_a041, 0x43ff_9a5c_f4ca_0c01, 0x4bff_cd8e_7c58_7601,
    0xfc0f_f286_5334_f576, 0xfc0b_f6ce_5924_f576, 0x0900_4204_4208_8104, 0x0062_0420_8404_0010,
    0x0138_0810_220a_0240, 0x0000_1010_0208_2800, 0xc3ff_b7dc_36ca_8c89, 0xc3ff_8a54_f4ca_2c89,
    0xffff_fcfc_fd79_edff, 0xfc08_63fc_cb14_7576, 0x0050_0090_4044_1000, 0x0013_9a00_0084_0400,
    0x9080_0004_1222_0a00, 0x0000_0020_2001_0a42, 0xfc08_7e8e_4bb2_f736, 0x43ff_9e4e_f4ca_2c89,
];
