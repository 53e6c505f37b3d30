//! Username and password generation for new mailboxes
//!
//! Usernames are a first name, a last name, two lowercase letters and
//! two digits glued together (`emmaparkerqk07`). Passwords are drawn
//! uniformly from the 62 ASCII alphanumerics. Neither is meant to be
//! cryptographically strong; the server applies its own password
//! policy.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of generated passwords unless the caller asks otherwise.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

const FIRST_NAMES: [&str; 40] = [
    "anna",
    "maria",
    "julia",
    "sophia",
    "emily",
    "emma",
    "olivia",
    "isabella",
    "ava",
    "mia",
    "madison",
    "elizabeth",
    "abigail",
    "hannah",
    "addison",
    "mike",
    "john",
    "david",
    "james",
    "robert",
    "michael",
    "william",
    "joseph",
    "charles",
    "thomas",
    "christopher",
    "daniel",
    "matthew",
    "anthony",
    "mark",
    "donald",
    "steven",
    "paul",
    "andrew",
    "joshua",
    "kenneth",
    "kevin",
    "brian",
    "george",
    "edward",
];

const LAST_NAMES: [&str; 51] = [
    "smith",
    "johnson",
    "williams",
    "brown",
    "jones",
    "miller",
    "davis",
    "garcia",
    "rodriguez",
    "wilson",
    "martinez",
    "anderson",
    "taylor",
    "thomas",
    "hernandez",
    "moore",
    "martin",
    "jackson",
    "thompson",
    "white",
    "lopez",
    "lee",
    "gonzalez",
    "harris",
    "clark",
    "lewis",
    "robinson",
    "walker",
    "perez",
    "hall",
    "young",
    "allen",
    "sanchez",
    "wright",
    "king",
    "scott",
    "green",
    "baker",
    "adams",
    "nelson",
    "hill",
    "ramirez",
    "campbell",
    "mitchell",
    "roberts",
    "carter",
    "phillips",
    "evans",
    "turner",
    "torres",
    "parker",
];

/// Generate a readable mailbox local-part made of lowercase letters
/// and digits only.
pub fn generate_username<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    let a = char::from(rng.gen_range(b'a'..=b'z'));
    let b = char::from(rng.gen_range(b'a'..=b'z'));
    let digits: u8 = rng.gen_range(0..100);
    format!("{first}{last}{a}{b}{digits:02}")
}

/// Generate a `length`-character alphanumeric password.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
