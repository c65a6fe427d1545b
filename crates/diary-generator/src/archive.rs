//! Year/month grouping of posts.

use std::collections::BTreeMap;

use diary_core::Post;
use serde::{Serialize, Serializer, ser::SerializeSeq};

/// Posts grouped by year, then by month (1-12).
///
/// Each month keeps its posts in the order they were added, so building from a
/// newest-first collection gives newest-first buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveIndex {
    years: BTreeMap<i32, BTreeMap<u32, Vec<Post>>>,
}

/// One month of an archive, as exposed to templates.
#[derive(Debug, Serialize)]
pub struct MonthGroup<'a> {
    pub month: u32,
    pub posts: &'a [Post],
}

/// One year of an archive, as exposed to templates.
#[derive(Debug, Serialize)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub months: Vec<MonthGroup<'a>>,
}

impl ArchiveIndex {
    /// Group `posts` by the local year and month of their dates.
    pub fn build(posts: &[Post]) -> Self {
        let mut years: BTreeMap<i32, BTreeMap<u32, Vec<Post>>> = BTreeMap::new();
        for post in posts {
            years
                .entry(post.year())
                .or_default()
                .entry(post.month())
                .or_default()
                .push(post.clone());
        }
        Self { years }
    }

    /// Posts published in `year`/`month`.
    pub fn get(&self, year: i32, month: u32) -> Option<&[Post]> {
        self.years
            .get(&year)
            .and_then(|months| months.get(&month))
            .map(Vec::as_slice)
    }

    /// Months with posts in `year`, ascending.
    pub fn months(&self, year: i32) -> Vec<u32> {
        self.years
            .get(&year)
            .map(|months| months.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Years with posts, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    /// Total number of posts across all buckets.
    pub fn len(&self) -> usize {
        self.years
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Groups newest first, years and months both descending.
    pub fn groups(&self) -> Vec<YearGroup<'_>> {
        self.years
            .iter()
            .rev()
            .map(|(&year, months)| YearGroup {
                year,
                months: months
                    .iter()
                    .rev()
                    .map(|(&month, posts)| MonthGroup { month, posts })
                    .collect(),
            })
            .collect()
    }
}

impl Serialize for ArchiveIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups = self.groups();
        let mut seq = serializer.serialize_seq(Some(groups.len()))?;
        for group in &groups {
            seq.serialize_element(group)?;
        }
        seq.end()
    }
}
