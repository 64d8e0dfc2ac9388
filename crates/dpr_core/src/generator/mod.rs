mod vocabulary;

pub use vocabulary::Vocabulary;

use crate::error::AppError;
use crate::model::Report;
use rand::Rng;
use rand::seq::index;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// How many items to draw from one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    Fixed(usize),
    /// Inclusive on both ends.
    Range { min: usize, max: usize },
}

impl SampleSize {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            Self::Fixed(count) => count,
            Self::Range { min, max } => {
                let (low, high) = if min <= max { (min, max) } else { (max, min) };
                rng.gen_range(low..=high)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSizes {
    pub tasks: SampleSize,
    pub issues: SampleSize,
    pub next_plans: SampleSize,
}

impl SampleSizes {
    pub fn webhook() -> Self {
        Self {
            tasks: SampleSize::Range { min: 2, max: 3 },
            issues: SampleSize::Range { min: 1, max: 2 },
            next_plans: SampleSize::Range { min: 2, max: 3 },
        }
    }

    pub fn repository() -> Self {
        Self {
            tasks: SampleSize::Fixed(2),
            issues: SampleSize::Fixed(1),
            next_plans: SampleSize::Fixed(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportGenerator {
    vocabulary: Vocabulary,
    sizes: SampleSizes,
}

impl ReportGenerator {
    pub fn new(vocabulary: Vocabulary, sizes: SampleSizes) -> Self {
        Self { vocabulary, sizes }
    }

    pub fn webhook() -> Self {
        Self::new(Vocabulary::webhook(), SampleSizes::webhook())
    }

    pub fn repository() -> Self {
        Self::new(Vocabulary::repository(), SampleSizes::repository())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn generate(&self) -> Result<Report, AppError> {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Report, AppError> {
        let date = format_now(DATE_FORMAT)?;
        let tasks_completed = sample(rng, &self.vocabulary.tasks, self.sizes.tasks);
        let issues_faced = sample(rng, &self.vocabulary.issues, self.sizes.issues);
        let next_plan = sample(rng, &self.vocabulary.next_plans, self.sizes.next_plans);
        let sent_at = format_now(TIMESTAMP_FORMAT)?;

        Ok(Report {
            date,
            tasks_completed,
            issues_faced,
            next_plan,
            sent_at,
        })
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, pool: &[String], size: SampleSize) -> Vec<String> {
    let amount = size.draw(rng).min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|position| pool[position].clone())
        .collect()
}

fn format_now(format: &[BorrowedFormatItem<'_>]) -> Result<String, AppError> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc()
        .to_offset(offset)
        .format(format)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
