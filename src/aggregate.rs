//! # Industry Aggregator
//! Per-industry sum / count / mean over any subset of records.
//!
//! Grouping is by exact industry string. The table iterates industries in
//! first-seen order, which is what ranking ties fall back to.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::ImpactRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryStats {
    pub industry: String,
    pub sum: f64,
    pub count: usize,
    pub mean: f64,
}

/// Insertion-ordered mapping industry → stats. Never holds a zero-count entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryTable {
    rows: Vec<IndustryStats>,
    index: HashMap<String, usize>,
}

impl IndustryTable {
    pub fn get(&self, industry: &str) -> Option<&IndustryStats> {
        self.index.get(industry).map(|&i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndustryStats> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<IndustryStats> {
        self.rows
    }

    fn add(&mut self, industry: &str, score: f64) {
        let i = match self.index.get(industry) {
            Some(&i) => i,
            None => {
                self.rows.push(IndustryStats {
                    industry: industry.to_string(),
                    sum: 0.0,
                    count: 0,
                    mean: 0.0,
                });
                self.index.insert(industry.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        let row = &mut self.rows[i];
        row.sum += score;
        row.count += 1;
    }

    fn finish(mut self) -> Self {
        for row in &mut self.rows {
            row.mean = row.sum / row.count as f64;
        }
        self
    }
}

pub fn aggregate<'a, I>(records: I) -> IndustryTable
where
    I: IntoIterator<Item = &'a ImpactRecord>,
{
    let mut table = IndustryTable::default();
    for r in records {
        table.add(&r.industry, r.score);
    }
    table.finish()
}

pub fn aggregate_where<'a, I, P>(records: I, mut keep: P) -> IndustryTable
where
    I: IntoIterator<Item = &'a ImpactRecord>,
    P: FnMut(&ImpactRecord) -> bool,
{
    aggregate(records.into_iter().filter(|r| keep(r)))
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (value * f).round() / f
}
