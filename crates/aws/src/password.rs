//! Temporary passwords that satisfy the default Cognito password policy.

use rand::seq::SliceRandom;
use rand::Rng;

pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const LENGTH: usize = 12;

pub fn generate_temporary_password() -> String {
    temporary_password_with(&mut rand::thread_rng())
}

/// 12 characters with at least one upper-case letter, lower-case letter,
/// digit and special character, in random positions.
pub fn temporary_password_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let pool: Vec<char> = [UPPER, LOWER, DIGITS, SPECIAL_CHARS].concat().chars().collect();
    let pick = |set: &str, rng: &mut R| {
        let chars: Vec<char> = set.chars().collect();
        chars[rng.gen_range(0..chars.len())]
    };

    let mut password: Vec<char> = vec![
        pick(UPPER, rng),
        pick(LOWER, rng),
        pick(DIGITS, rng),
        pick(SPECIAL_CHARS, rng),
    ];
    while password.len() < LENGTH {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }
    password.shuffle(rng);
    password.into_iter().collect()
}
