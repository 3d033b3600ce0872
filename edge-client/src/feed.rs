use chrono::{Duration, NaiveDate};

use crate::api::{Article, Time};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FeedOrder {
    #[default]
    Latest,
    Earliest,
}

impl FeedOrder {
    pub fn sort(&self, articles: &mut [Article]) {
        match self {
            FeedOrder::Latest => articles.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            FeedOrder::Earliest => articles.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
    }
}

/// Articles published on the same (UTC) day
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub label: String,
    pub articles: Vec<Article>,
}

fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        String::from("Today")
    } else if Some(day) == today.checked_sub_signed(Duration::days(1)) {
        String::from("Yesterday")
    } else {
        day.format("%B %-d, %Y").to_string()
    }
}

/// Sorts the feed and splits it into consecutive days
pub fn group_by_day(mut articles: Vec<Article>, order: FeedOrder, now: Time) -> Vec<DayGroup> {
    order.sort(&mut articles);
    let today = now.date_naive();
    let mut res: Vec<DayGroup> = Vec::new();
    for a in articles {
        let day = a.created_at.date_naive();
        match res.last_mut() {
            Some(g) if g.day == day => g.articles.push(a),
            _ => res.push(DayGroup {
                day,
                label: day_label(day, today),
                articles: vec![a],
            }),
        }
    }
    res
}

/// Host part of `url` without its `www.` prefix, for display next to links
pub fn pretty_hostname(url: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse(url)?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("url {url} has no host"))?;
    Ok(String::from(host.strip_prefix("www.").unwrap_or(host)))
}
