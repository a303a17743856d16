use rand::Rng;

/// Length of the codes mailed to users.
pub const OTP_LENGTH: usize = 6;

/// Generates a numeric one-time code of `length` digits. Leading zeros are kept.
pub fn generate_otp(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
