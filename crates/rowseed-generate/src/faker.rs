use fake::Fake;
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::{FirstName, LastName, Name};
use fake::locales::{EN, PT_BR};
use rand::{Rng, RngCore};

use rowseed_plan::Locale;

/// Provider of realistic person and organization names.
pub trait Faker: Send + Sync {
    fn full_name(&self, rng: &mut dyn RngCore) -> String;
    fn first_name(&self, rng: &mut dyn RngCore) -> String;
    fn middle_name(&self, rng: &mut dyn RngCore) -> String;
    fn last_name(&self, rng: &mut dyn RngCore) -> String;
    fn company_name(&self, rng: &mut dyn RngCore) -> String;
}

/// Faker backed by the `fake` crate's locale data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeRsFaker {
    locale: Locale,
}

impl FakeRsFaker {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Faker for FakeRsFaker {
    fn full_name(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            Locale::EnUs => Name(EN).fake_with_rng(rng),
            Locale::PtBr => Name(PT_BR).fake_with_rng(rng),
        }
    }

    fn first_name(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            Locale::EnUs => FirstName(EN).fake_with_rng(rng),
            Locale::PtBr => FirstName(PT_BR).fake_with_rng(rng),
        }
    }

    // No middle-name dataset exists upstream; a second given name reads naturally.
    fn middle_name(&self, rng: &mut dyn RngCore) -> String {
        self.first_name(rng)
    }

    fn last_name(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            Locale::EnUs => LastName(EN).fake_with_rng(rng),
            Locale::PtBr => LastName(PT_BR).fake_with_rng(rng),
        }
    }

    fn company_name(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            Locale::EnUs => CompanyName(EN).fake_with_rng(rng),
            Locale::PtBr => CompanyName(PT_BR).fake_with_rng(rng),
        }
    }
}

/// Fixed word-list faker used when realistic data is not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalFaker;

const FIRST_NAMES: &[&str] = &["John", "Mary"];
const MIDDLE_NAMES: &[&str] = &["Madison", "Ashley"];
const LAST_NAMES: &[&str] = &["Doe", "Smith"];

fn pick(words: &[&str], rng: &mut dyn RngCore) -> String {
    words[rng.random_range(0..words.len())].to_string()
}

impl Faker for MinimalFaker {
    fn full_name(&self, rng: &mut dyn RngCore) -> String {
        let first = self.first_name(rng);
        let last = self.last_name(rng);
        format!("{first} {last}")
    }

    fn first_name(&self, rng: &mut dyn RngCore) -> String {
        pick(FIRST_NAMES, rng)
    }

    fn middle_name(&self, rng: &mut dyn RngCore) -> String {
        pick(MIDDLE_NAMES, rng)
    }

    fn last_name(&self, rng: &mut dyn RngCore) -> String {
        pick(LAST_NAMES, rng)
    }

    fn company_name(&self, _rng: &mut dyn RngCore) -> String {
        "Acme".to_string()
    }
}

/// Default faker for a locale.
pub fn faker_for_locale(locale: Locale) -> FakeRsFaker {
    FakeRsFaker::new(locale)
}
