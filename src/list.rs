//! A stateful facade over the key generators.
//!
//! `OrderList` tracks a sorted snapshot of the caller's keys so that
//! "insert before/after this key" only needs the key itself: the facade
//! resolves the neighbor and delegates to the generators with the right
//! bounds. The snapshot is replaced wholesale by `update_list` and never
//! mutated otherwise; persistence of the keys stays the caller's problem.
//!
//! With a group-id length configured, the snapshot is treated as disjoint
//! ordering spaces distinguished by a fixed-length key prefix. The prefix
//! is stripped before every call into the core engine and reattached to
//! every produced key, so groups never interleave and neighbor lookups
//! never cross a group boundary.

use tracing::warn;

use crate::between;
use crate::charset::CharacterSet;
use crate::charset::base62;
use crate::error::Error;
use crate::error::Result;
use crate::jitter;

/// Facade configuration, resolved once at construction.
#[derive(Clone, Debug)]
pub struct OrderListConfig {
    /// Character set for all generated keys; the cached base62 set when
    /// absent.
    pub charset: Option<CharacterSet>,
    /// Whether generated keys get a random jitter suffix. On by default:
    /// uncoordinated writers are the reason this crate exists.
    pub use_jitter: bool,
    /// Fixed length of the group-id prefix; `None` (or 0) disables
    /// grouping.
    pub group_id_length: Option<usize>,
}

impl Default for OrderListConfig {
    fn default() -> OrderListConfig {
        return OrderListConfig {
            charset: None,
            use_jitter: true,
            group_id_length: None,
        };
    }
}

/// A sorted snapshot of order keys plus the configuration to generate more.
#[derive(Clone, Debug)]
pub struct OrderList {
    list: Vec<String>,
    charset: CharacterSet,
    use_jitter: bool,
    group_id_length: usize,
}

impl OrderList {
    /// Build a facade over an initial list of keys. The list is copied and
    /// sorted; the caller's vector is taken by value and never handed back.
    pub fn new(initial: Vec<String>, config: OrderListConfig) -> OrderList {
        let mut list = initial;
        list.sort();
        return OrderList {
            list,
            charset: config.charset.unwrap_or_else(|| base62().clone()),
            use_jitter: config.use_jitter,
            group_id_length: config.group_id_length.unwrap_or(0),
        };
    }

    /// Replace the tracked snapshot with a sorted copy of `list`. The
    /// argument is not mutated.
    pub fn update_list(&mut self, list: &[String]) {
        let mut copy = list.to_vec();
        copy.sort();
        self.list = copy;
    }

    /// The tracked snapshot, sorted.
    pub fn list(&self) -> &[String] {
        return &self.list;
    }

    /// Generate `n` keys before the first key of the list, or of the given
    /// group when grouping is enabled.
    pub fn n_keys_start(&self, n: usize, group_id: Option<&str>) -> Result<Vec<String>> {
        let group = self.checked_group_id(group_id)?;
        let upper = self.first_of_group(group);
        return self.generate(None, upper, n, group);
    }

    /// Generate a single key before the first key of the list or group.
    pub fn key_start(&self, group_id: Option<&str>) -> Result<String> {
        return Ok(self
            .n_keys_start(1, group_id)?
            .pop()
            .expect("n = 1 generates exactly one key"));
    }

    /// Generate `n` keys after the last key of the list, or of the given
    /// group when grouping is enabled.
    pub fn n_keys_end(&self, n: usize, group_id: Option<&str>) -> Result<Vec<String>> {
        let group = self.checked_group_id(group_id)?;
        let lower = self.last_of_group(group);
        return self.generate(lower, None, n, group);
    }

    /// Generate a single key after the last key of the list or group.
    pub fn key_end(&self, group_id: Option<&str>) -> Result<String> {
        return Ok(self
            .n_keys_end(1, group_id)?
            .pop()
            .expect("n = 1 generates exactly one key"));
    }

    /// Generate `n` keys directly after `order_key`, before its next
    /// same-group neighbor. The group id is inferred from the key itself.
    pub fn n_keys_after(&self, order_key: &str, n: usize) -> Result<Vec<String>> {
        let neighbor = self.neighbor_after(order_key)?;
        let group = self.inferred_group(order_key);
        return self.generate(Some(order_key), neighbor, n, group);
    }

    /// Generate a single key directly after `order_key`.
    pub fn key_after(&self, order_key: &str) -> Result<String> {
        return Ok(self
            .n_keys_after(order_key, 1)?
            .pop()
            .expect("n = 1 generates exactly one key"));
    }

    /// Generate `n` keys directly before `order_key`, after its previous
    /// same-group neighbor. The group id is inferred from the key itself.
    pub fn n_keys_before(&self, order_key: &str, n: usize) -> Result<Vec<String>> {
        let neighbor = self.neighbor_before(order_key)?;
        let group = self.inferred_group(order_key);
        return self.generate(neighbor, Some(order_key), n, group);
    }

    /// Generate a single key directly before `order_key`.
    pub fn key_before(&self, order_key: &str) -> Result<String> {
        return Ok(self
            .n_keys_before(order_key, 1)?
            .pop()
            .expect("n = 1 generates exactly one key"));
    }

    fn use_groups(&self) -> bool {
        return self.group_id_length > 0;
    }

    /// Strip group prefixes, run the configured generator, reattach the
    /// prefix to every produced key.
    fn generate(
        &self,
        lower: Option<&str>,
        upper: Option<&str>,
        n: usize,
        group: Option<&str>,
    ) -> Result<Vec<String>> {
        let lower = lower.map(|key| self.strip_group(key));
        let upper = upper.map(|key| self.strip_group(key));
        let keys = if self.use_jitter {
            jitter::generate_n_jittered_keys_between(lower, upper, n, &self.charset)?
        } else {
            between::generate_n_keys_between(lower, upper, n, &self.charset)?
        };
        return match group {
            Some(group) => Ok(keys.into_iter().map(|key| format!("{group}{key}")).collect()),
            None => Ok(keys),
        };
    }

    /// Validate a caller-supplied group id against the configuration.
    fn checked_group_id<'a>(&self, group_id: Option<&'a str>) -> Result<Option<&'a str>> {
        if !self.use_groups() {
            if group_id.is_some() {
                warn!("group id supplied but grouping is not enabled; ignoring it");
            }
            return Ok(None);
        }
        let group = group_id.ok_or(Error::GroupIdRequired)?;
        if group.chars().count() != self.group_id_length {
            return Err(Error::GroupIdLength {
                expected: self.group_id_length,
                got: group.to_string(),
            });
        }
        return Ok(Some(group));
    }

    /// Split a full key into its group prefix and the core key.
    fn split_key<'a>(&self, key: &'a str) -> (&'a str, &'a str) {
        let at = key
            .char_indices()
            .nth(self.group_id_length)
            .map(|(i, _)| i)
            .unwrap_or(key.len());
        return key.split_at(at);
    }

    fn strip_group<'a>(&self, key: &'a str) -> &'a str {
        if !self.use_groups() {
            return key;
        }
        return self.split_key(key).1;
    }

    fn inferred_group<'a>(&self, key: &'a str) -> Option<&'a str> {
        if !self.use_groups() {
            return None;
        }
        return Some(self.split_key(key).0);
    }

    fn same_group(&self, a: &str, b: &str) -> bool {
        if !self.use_groups() {
            return true;
        }
        return self.split_key(a).0 == self.split_key(b).0;
    }

    fn position_of(&self, order_key: &str) -> Result<usize> {
        return self
            .list
            .binary_search_by(|key| key.as_str().cmp(order_key))
            .map_err(|_| Error::KeyNotInList(order_key.to_string()));
    }

    /// The key after `order_key` in the snapshot, if it exists and shares
    /// the group. `None` means an open upper bound.
    fn neighbor_after(&self, order_key: &str) -> Result<Option<&str>> {
        let index = self.position_of(order_key)?;
        let after = self.list.get(index + 1);
        return Ok(after
            .filter(|key| self.same_group(order_key, key))
            .map(|key| key.as_str()));
    }

    /// The key before `order_key` in the snapshot, if it exists and shares
    /// the group. `None` means an open lower bound.
    fn neighbor_before(&self, order_key: &str) -> Result<Option<&str>> {
        let index = self.position_of(order_key)?;
        let before = index.checked_sub(1).and_then(|i| self.list.get(i));
        return Ok(before
            .filter(|key| self.same_group(order_key, key))
            .map(|key| key.as_str()));
    }

    /// First key of the group, or of the whole list without grouping.
    fn first_of_group(&self, group: Option<&str>) -> Option<&str> {
        let first = match group {
            None => self.list.first(),
            Some(group) => self.list.iter().find(|key| self.split_key(key).0 == group),
        };
        return first.map(|key| key.as_str());
    }

    /// Last key of the group, or of the whole list without grouping.
    fn last_of_group(&self, group: Option<&str>) -> Option<&str> {
        let last = match group {
            None => self.list.last(),
            Some(group) => self
                .list
                .iter()
                .rev()
                .find(|key| self.split_key(key).0 == group),
        };
        return last.map(|key| key.as_str());
    }
}
