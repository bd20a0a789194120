//! In-memory representation of one GTFS dataset.
//!
//! Tables keyed by a single id use [`IndexedTable`], which preserves
//! insertion order alongside id lookup — the merge driver's output-ordering
//! invariants depend on iterating tables in the order entities were first
//! added, not in whatever order a `HashMap` happens to produce.
use std::collections::{BTreeSet, HashMap};

use crate::ids::{AgencyId, AreaId, FareId, PathwayId, RouteId, ServiceId, ShapeId, StopId};
use crate::model::{
    Agency, Area, Calendar, CalendarDate, FareAttribute, FareRule, FeedInfo, Frequency, Pathway,
    Route, ShapePoint, Stop, StopTime, Transfer, Trip,
};

/// An id-keyed table that remembers the order ids were first inserted in.
#[derive(Clone, Debug, Default)]
pub struct IndexedTable<K, V> {
    order: Vec<K>,
    by_id: HashMap<K, V>,
}

impl<K, V> IndexedTable<K, V>
where
    K: Clone + Eq + std::hash::Hash,
{
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Inserts `value` under `key`, appending to the order list only if the
    /// key is new. Returns the previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if !self.by_id.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.by_id.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.by_id.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.by_id.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(move |k| {
            (
                k,
                self.by_id
                    .get(k)
                    .unwrap_or_else(|| unreachable!("order list and map are kept in sync")),
            )
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

/// A table with no single natural key: entities are appended in insertion
/// order and deduplicated externally by the owning strategy via a composite
/// key it computes itself.
pub type OrderedList<V> = Vec<V>;

/// A table keyed by id to an ordered sequence of child rows (shapes and
/// calendar dates: many rows share a parent id and must stay grouped and
/// ordered).
#[derive(Clone, Debug, Default)]
pub struct GroupedTable<K, V> {
    order: Vec<K>,
    groups: HashMap<K, Vec<V>>,
}

impl<K, V> GroupedTable<K, V>
where
    K: Clone + Eq + std::hash::Hash,
{
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            groups: HashMap::new(),
        }
    }

    pub fn push(&mut self, key: K, value: V) {
        self.groups.entry(key.clone()).or_insert_with(|| {
            self.order.push(key.clone());
            Vec::new()
        });
        if let Some(group) = self.groups.get_mut(&key) {
            group.push(value);
        }
    }

    pub fn get(&self, key: &K) -> Option<&Vec<V>> {
        self.groups.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.groups.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Vec<V>)> {
        self.order.iter().map(move |k| {
            (
                k,
                self.groups
                    .get(k)
                    .unwrap_or_else(|| unreachable!("order list and map are kept in sync")),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Per-filename set of column names observed while reading, unioned across
/// source feeds so the writer emits every column any source supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnSets(pub HashMap<String, BTreeSet<String>>);

impl ColumnSets {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn record(&mut self, filename: &str, columns: impl IntoIterator<Item = String>) {
        self.0
            .entry(filename.to_owned())
            .or_default()
            .extend(columns);
    }

    pub fn union_with(&mut self, other: &ColumnSets) {
        for (file, cols) in &other.0 {
            self.0.entry(file.clone()).or_default().extend(cols.iter().cloned());
        }
    }

    pub fn columns_for(&self, filename: &str) -> Option<&BTreeSet<String>> {
        self.0.get(filename)
    }
}

/// One GTFS dataset: the fifteen entity tables plus the column sets the
/// reader observed.
#[derive(Debug, Default)]
pub struct Feed {
    pub agencies: IndexedTable<AgencyId, Agency>,
    pub areas: IndexedTable<AreaId, Area>,
    pub stops: IndexedTable<StopId, Stop>,
    pub routes: IndexedTable<RouteId, Route>,
    pub trips: IndexedTable<crate::ids::TripId, Trip>,
    pub stop_times: OrderedList<StopTime>,
    pub calendars: IndexedTable<ServiceId, Calendar>,
    pub calendar_dates: GroupedTable<ServiceId, CalendarDate>,
    pub shapes: GroupedTable<ShapeId, ShapePoint>,
    pub frequencies: OrderedList<Frequency>,
    pub transfers: OrderedList<Transfer>,
    pub pathways: IndexedTable<PathwayId, Pathway>,
    pub fare_attributes: IndexedTable<FareId, FareAttribute>,
    pub fare_rules: OrderedList<FareRule>,
    pub feed_infos: IndexedTable<String, FeedInfo>,
    pub columns: ColumnSets,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// A feed with no agencies, stops, routes, trips, or calendars — used by
    /// auto-detection to recognize a feed that carries no identity to
    /// compare against.
    pub fn is_empty_feed(&self) -> bool {
        self.agencies.is_empty()
            && self.stops.is_empty()
            && self.routes.is_empty()
            && self.trips.is_empty()
            && self.calendars.is_empty()
            && self.calendar_dates.is_empty()
    }
}
