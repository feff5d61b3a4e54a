//! Human-readable "why was this recommended" strings.
//!
//! The top reason (highest `similarity * rating`) decides the wording:
//!
//! | top reason | text |
//! |---|---|
//! | similar-content algorithm | "Because you liked similar content" |
//! | trending | "Trending this week" |
//! | a friend | "Because {name} (your friend) watched this" |
//! | a stranger, several reasons, some friends | "Because {f} friends and {o} similar users watched this" |
//! | a stranger, several reasons, no friends | "Because {n} similar users watched this" |
//! | a stranger, single reason | "Because {name} watched this" |

use sources::{AlgorithmicLabel, ReasonEntry};
use std::cmp::Ordering;

/// Explain a candidate from its reasons; `None` when there are none.
///
/// Pure: the same reasons always give the same string. Ties in weight keep
/// the input order.
pub fn explain(reasons: &[ReasonEntry]) -> Option<String> {
    let top = reasons.iter().reduce(|best, r| {
        match r.weight().partial_cmp(&best.weight()) {
            Some(Ordering::Greater) => r,
            _ => best,
        }
    })?;

    let text = match top {
        ReasonEntry::Algorithmic {
            label: AlgorithmicLabel::SimilarContent,
        } => "Because you liked similar content".to_string(),
        ReasonEntry::Algorithmic {
            label: AlgorithmicLabel::Trending,
        } => "Trending this week".to_string(),
        ReasonEntry::Friend { username, .. } => {
            format!("Because {username} (your friend) watched this")
        }
        ReasonEntry::SimilarUser { username, .. } => {
            if reasons.len() > 1 {
                let friends = reasons.iter().filter(|r| r.is_friend()).count();
                let total = reasons.len();
                if friends > 0 {
                    format!(
                        "Because {friends} friends and {} similar users watched this",
                        total - friends
                    )
                } else {
                    format!("Because {total} similar users watched this")
                }
            } else {
                format!("Because {username} watched this")
            }
        }
    };
    Some(text)
}
