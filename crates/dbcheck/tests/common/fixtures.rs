//! Test data for the fixture tables.
//!
//! Generated names come from small fixed pools; generated dates fall between
//! 1940 and 2010.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;

use helios_dbcheck::persons::PersonRecord;

const LATIN_FIRST_NAMES: &[&str] = &[
    "Oliver", "Amelia", "George", "Isla", "Harry", "Ava", "Noah", "Mia", "Jack", "Grace",
];

const LATIN_LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Taylor", "Brown", "Williams", "Wilson", "Johnson", "Davies",
];

const CYRILLIC_FIRST_NAMES: &[&str] = &[
    "Наташа",
    "Алексей",
    "Ирина",
    "Дмитрий",
    "Ольга",
    "Сергей",
    "Татьяна",
    "Михаил",
];

const CYRILLIC_LAST_NAMES: &[&str] = &[
    "Иванов",
    "Смирнов",
    "Кузнецов",
    "Попов",
    "Васильев",
    "Петров",
    "Соколов",
];

const CYRILLIC_PATRONYMICS: &[&str] = &[
    "Иванович",
    "Петрович",
    "Сергеевич",
    "Андреевич",
    "Николаевич",
];

fn pick(pool: &[&str]) -> String {
    pool.choose(&mut rand::thread_rng())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// A Latin first name.
pub fn latin_first_name() -> String {
    pick(LATIN_FIRST_NAMES)
}

/// A Latin last name.
pub fn latin_last_name() -> String {
    pick(LATIN_LAST_NAMES)
}

/// A Cyrillic first name.
pub fn cyrillic_first_name() -> String {
    pick(CYRILLIC_FIRST_NAMES)
}

/// A Cyrillic full name: last name, first name, patronymic.
pub fn cyrillic_full_name() -> String {
    format!(
        "{} {} {}",
        pick(CYRILLIC_LAST_NAMES),
        pick(CYRILLIC_FIRST_NAMES),
        pick(CYRILLIC_PATRONYMICS)
    )
}

/// A six-digit numeric string.
pub fn numeric_string() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// A `YYYY-MM-DD` date.
pub fn date_string() -> String {
    let mut rng = rand::thread_rng();
    let year = rng.gen_range(1940..=2010);
    let month = rng.gen_range(1..=12);
    // Every month has a 28th.
    let day = rng.gen_range(1..=28);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// A name of exactly `len` characters.
pub fn name_of_len(len: usize) -> String {
    "A".repeat(len)
}

/// A fully populated `persons` row.
pub fn plisetskaya() -> PersonRecord {
    PersonRecord {
        first_name: "Майа".to_string(),
        family_name: "Плисецкая".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1925, 11, 20).expect("valid date"),
        place_of_birth: "Москва".to_string(),
        occupation: "Балерина".to_string(),
        hobby: "Вырезки из газет".to_string(),
    }
}
