use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{Result, SplitbookError};
use crate::models::{validate_split, SplitRule};

/// Key of the JSON rules blob in the `config` table.
pub const RULES_CONFIG_KEY: &str = "split_rules";

const CACHE_TTL: Duration = Duration::from_secs(60);

// Lowercase alias -> canonical category. Only aliases that the
// capitalize-first fallback would not already produce.
const CATEGORY_SYNONYMS: &[(&str, &str)] = &[
    ("grocery", "Groceries"),
    ("food", "Groceries"),
    ("supermarket", "Groceries"),
    ("restaurant", "Dining"),
    ("restaurants", "Dining"),
    ("takeout", "Dining"),
    ("eating out", "Dining"),
    ("housing", "Rent"),
    ("mortgage", "Rent"),
    ("utility", "Utilities"),
    ("power", "Utilities"),
    ("electricity", "Utilities"),
    ("internet", "Utilities"),
    ("transportation", "Transport"),
    ("transit", "Transport"),
    ("fuel", "Transport"),
    ("gas", "Transport"),
    ("movies", "Entertainment"),
    ("streaming", "Entertainment"),
    ("vacation", "Travel"),
    ("holiday", "Travel"),
    ("medical", "Health"),
    ("pharmacy", "Health"),
    ("doctor", "Health"),
    ("payment", "Settlement"),
    ("repayment", "Settlement"),
    ("payback", "Settlement"),
];

/// Folds a free-form category to its canonical name: trim, lowercase,
/// synonym lookup, else capitalize the first letter.
pub fn normalize_category(raw: &str) -> String {
    let folded = raw.trim().to_lowercase();
    for (alias, canonical) in CATEGORY_SYNONYMS {
        if *alias == folded {
            return (*canonical).to_string();
        }
    }
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The split applied when no rule covers a category: even halves.
pub fn default_split() -> SplitRule {
    SplitRule {
        percent_a: Decimal::new(5, 1),
        percent_b: Decimal::new(5, 1),
    }
}

struct CachedRules {
    rules: BTreeMap<String, SplitRule>,
    expires_at: Instant,
}

/// Read-through cache over the persisted rules blob.
///
/// Lookups fail open: an unreadable or corrupt blob degrades to the
/// even default instead of erroring, so balance math always has a
/// split to work with. Updates invalidate the cache on both sides of
/// the write; other processes converge within the TTL.
pub struct SplitRuleStore {
    cache: Mutex<Option<CachedRules>>,
    ttl: Duration,
}

impl Default for SplitRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitRuleStore {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(None),
            ttl,
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<CachedRules>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn invalidate(&self) {
        *self.lock_cache() = None;
    }

    /// Effective split for a category. Never errors: unknown category,
    /// unreadable blob, and invalid persisted entries all resolve to
    /// the even default.
    pub fn get_rule(&self, conn: &Connection, category: &str) -> SplitRule {
        let canonical = normalize_category(category);
        self.all_rules(conn)
            .get(&canonical)
            .copied()
            .unwrap_or_else(default_split)
    }

    /// All persisted rules, keyed by canonical category. Entries that
    /// no longer satisfy the split invariant are dropped from the
    /// result, not returned broken.
    pub fn all_rules(&self, conn: &Connection) -> BTreeMap<String, SplitRule> {
        {
            let cache = self.lock_cache();
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    return cached.rules.clone();
                }
            }
        }

        let raw = match read_rules_blob(conn) {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "split rules unreadable, using defaults");
                BTreeMap::new()
            }
        };
        let mut rules = BTreeMap::new();
        for (category, rule) in raw {
            if let Err(e) = validate_split(rule.percent_a, rule.percent_b) {
                warn!(%category, error = %e, "dropping invalid persisted split rule");
                continue;
            }
            rules.insert(category, rule);
        }
        debug!(count = rules.len(), "split rule cache refreshed");

        *self.lock_cache() = Some(CachedRules {
            rules: rules.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        rules
    }

    /// Upserts the rule for one category into the persisted blob and
    /// invalidates the cache around the write, so a read in the same
    /// process is never stale.
    pub fn update_rule(
        &self,
        conn: &Connection,
        category: &str,
        percent_a: Decimal,
        percent_b: Decimal,
    ) -> Result<String> {
        validate_split(percent_a, percent_b)?;
        let canonical = normalize_category(category);
        if canonical.is_empty() {
            return Err(SplitbookError::Validation("category must not be empty".into()));
        }

        self.invalidate();
        let mut rules = match read_rules_blob(conn) {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "split rules blob unreadable, rewriting");
                BTreeMap::new()
            }
        };
        rules.insert(
            canonical.clone(),
            SplitRule {
                percent_a,
                percent_b,
            },
        );
        write_rules_blob(conn, &rules)?;
        self.invalidate();
        debug!(category = %canonical, %percent_a, %percent_b, "split rule updated");
        Ok(canonical)
    }
}

fn read_rules_blob(conn: &Connection) -> Result<BTreeMap<String, SplitRule>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM config WHERE key = ?1",
            [RULES_CONFIG_KEY],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        None => Ok(BTreeMap::new()),
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| SplitbookError::Config(format!("bad split rules blob: {e}"))),
    }
}

fn write_rules_blob(conn: &Connection, rules: &BTreeMap<String, SplitRule>) -> Result<()> {
    let json = serde_json::to_string(rules)
        .map_err(|e| SplitbookError::Config(format!("cannot encode split rules: {e}")))?;
    conn.execute(
        "INSERT INTO config (key, value, updated_at) VALUES (?1, ?2, datetime('now')) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![RULES_CONFIG_KEY, json],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rust_decimal_macros::dec;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::get_connection(&dir.path().join("test.db")).unwrap();
        db::init_db(&conn).unwrap();
        (dir, conn)
    }

    fn put_blob(conn: &Connection, json: &str) {
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![RULES_CONFIG_KEY, json],
        )
        .unwrap();
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(" GROCERY "), "Groceries");
        assert_eq!(normalize_category("food"), "Groceries");
        assert_eq!(normalize_category("groceries"), "Groceries");
        assert_eq!(normalize_category("Takeout"), "Dining");
        assert_eq!(normalize_category("date night"), "Date night");
        assert_eq!(normalize_category(""), "");
        assert_eq!(normalize_category("   "), "");
    }

    #[test]
    fn test_unknown_category_gets_even_default() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        let rule = store.get_rule(&conn, "Llamas");
        assert_eq!(rule.percent_a, dec!(0.5));
        assert_eq!(rule.percent_b, dec!(0.5));
    }

    #[test]
    fn test_update_then_get_is_never_stale() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        // prime the cache with the empty blob
        assert!(store.all_rules(&conn).is_empty());

        store.update_rule(&conn, "groceries", dec!(0.6), dec!(0.4)).unwrap();
        let rule = store.get_rule(&conn, "Grocery");
        assert_eq!(rule.percent_a, dec!(0.6));
        assert_eq!(rule.percent_b, dec!(0.4));
    }

    #[test]
    fn test_updates_merge_across_categories() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        store.update_rule(&conn, "groceries", dec!(0.6), dec!(0.4)).unwrap();
        store.update_rule(&conn, "rent", dec!(0.7), dec!(0.3)).unwrap();
        let rules = store.all_rules(&conn);
        assert_eq!(rules.len(), 2);
        assert!(rules.contains_key("Groceries"));
        assert!(rules.contains_key("Rent"));
    }

    #[test]
    fn test_cache_serves_stale_reads_within_ttl() {
        let (_dir, conn) = test_db();
        let cached = SplitRuleStore::with_ttl(Duration::from_secs(600));
        let fresh = SplitRuleStore::with_ttl(Duration::ZERO);

        cached.all_rules(&conn);
        put_blob(&conn, r#"{"Rent":{"percent_a":"0.7","percent_b":"0.3"}}"#);

        // behind-the-back write is invisible until the TTL lapses
        assert!(cached.all_rules(&conn).is_empty());
        assert_eq!(fresh.all_rules(&conn).len(), 1);
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_defaults() {
        let (_dir, conn) = test_db();
        put_blob(&conn, "not json at all {{{");
        let store = SplitRuleStore::with_ttl(Duration::ZERO);
        assert!(store.all_rules(&conn).is_empty());
        let rule = store.get_rule(&conn, "groceries");
        assert_eq!(rule.percent_a, dec!(0.5));
    }

    #[test]
    fn test_update_rewrites_corrupt_blob() {
        let (_dir, conn) = test_db();
        put_blob(&conn, "garbage");
        let store = SplitRuleStore::with_ttl(Duration::ZERO);
        store.update_rule(&conn, "rent", dec!(0.7), dec!(0.3)).unwrap();
        let rules = store.all_rules(&conn);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules["Rent"].percent_a, dec!(0.7));
    }

    #[test]
    fn test_invalid_persisted_entries_are_dropped() {
        let (_dir, conn) = test_db();
        put_blob(
            &conn,
            r#"{"Rent":{"percent_a":"0.7","percent_b":"0.3"},"Broken":{"percent_a":"0.9","percent_b":"0.3"}}"#,
        );
        let store = SplitRuleStore::with_ttl(Duration::ZERO);
        let rules = store.all_rules(&conn);
        assert_eq!(rules.len(), 1);
        assert!(rules.contains_key("Rent"));
    }

    #[test]
    fn test_update_rule_validates_input() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        assert!(store.update_rule(&conn, "x", dec!(0.6), dec!(0.6)).is_err());
        assert!(store.update_rule(&conn, "x", dec!(-0.1), dec!(1.1)).is_err());
        assert!(store.update_rule(&conn, "  ", dec!(0.5), dec!(0.5)).is_err());
    }

    #[test]
    fn test_update_returns_canonical_category() {
        let (_dir, conn) = test_db();
        let store = SplitRuleStore::new();
        let canonical = store.update_rule(&conn, " FOOD ", dec!(0.6), dec!(0.4)).unwrap();
        assert_eq!(canonical, "Groceries");
    }
}
