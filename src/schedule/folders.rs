use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::TimeOfDay;

/// One of the six media buckets a channel is scheduled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Bucket {
    Morning,
    Evening,
    Night,
    Commercials,
    Intros,
    Outros,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Morning,
        Bucket::Evening,
        Bucket::Night,
        Bucket::Commercials,
        Bucket::Intros,
        Bucket::Outros,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Morning => "morning",
            Bucket::Evening => "evening",
            Bucket::Night => "night",
            Bucket::Commercials => "commercials",
            Bucket::Intros => "intros",
            Bucket::Outros => "outros",
        }
    }
}

impl From<TimeOfDay> for Bucket {
    fn from(period: TimeOfDay) -> Self {
        match period {
            TimeOfDay::Morning => Bucket::Morning,
            TimeOfDay::Evening => Bucket::Evening,
            TimeOfDay::Night => Bucket::Night,
        }
    }
}

/// Media assigned to one channel.
///
/// All six buckets are always present; a bucket missing or null in persisted
/// data deserializes as empty, and null entries inside a bucket are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSelection {
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub morning: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub evening: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub night: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub commercials: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub intros: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub outros: Vec<String>,
}

fn lenient_bucket<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    let entries = entries.unwrap_or_default();
    let total = entries.len();
    let uris: Vec<String> = entries.into_iter().flatten().collect();
    if uris.len() < total {
        warn!(skipped = total - uris.len(), "Missing media entries skipped");
    }
    Ok(uris)
}

impl FolderSelection {
    pub fn bucket(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Morning => &self.morning,
            Bucket::Evening => &self.evening,
            Bucket::Night => &self.night,
            Bucket::Commercials => &self.commercials,
            Bucket::Intros => &self.intros,
            Bucket::Outros => &self.outros,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Morning => &mut self.morning,
            Bucket::Evening => &mut self.evening,
            Bucket::Night => &mut self.night,
            Bucket::Commercials => &mut self.commercials,
            Bucket::Intros => &mut self.intros,
            Bucket::Outros => &mut self.outros,
        }
    }

    /// Content for a broadcast period
    pub fn slot(&self, period: TimeOfDay) -> &[String] {
        self.bucket(period.into())
    }

    /// Append selected media to a bucket
    pub fn append<I>(&mut self, bucket: Bucket, uris: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.bucket_mut(bucket).extend(uris);
    }

    pub fn is_empty(&self) -> bool {
        Bucket::ALL.iter().all(|b| self.bucket(*b).is_empty())
    }
}
