//! The fixed set of data routes subject to time-based pagination.

/// A resource collection large enough to require time-sliced requests.
#[derive(Debug)]
pub(crate) struct DataRoute {
    pub(crate) name: &'static str,
    /// Options that scope a request tightly enough to skip slicing.
    pub(crate) scoping_params: &'static [&'static str],
    /// Timestamp of the oldest record in the collection, wire format.
    pub(crate) earliest_record: &'static str,
}

pub(crate) const DATA_ROUTES: &[DataRoute] = &[
    DataRoute {
        name: "argo",
        scoping_params: &["id", "platform"],
        earliest_record: "1997-07-27T20:26:20.002Z",
    },
    DataRoute {
        name: "cchdo",
        scoping_params: &["id", "woceline", "cchdo_cruise"],
        earliest_record: "1977-10-06T00:00:00.000Z",
    },
    DataRoute {
        name: "drifters",
        scoping_params: &["id", "wmo", "platform"],
        earliest_record: "1987-10-01T13:00:00.000Z",
    },
    DataRoute {
        name: "tc",
        scoping_params: &["id", "name"],
        earliest_record: "1851-06-24T00:00:00.000Z",
    },
    DataRoute {
        name: "grids/rg09",
        scoping_params: &["id"],
        earliest_record: "2004-01-14T00:00:00.000Z",
    },
    DataRoute {
        name: "grids/kg21",
        scoping_params: &["id"],
        earliest_record: "2004-01-14T00:00:00.000Z",
    },
];

/// Looks up a normalized (separator-trimmed) route name in the table.
pub(crate) fn lookup(route: &str) -> Option<&'static DataRoute> {
    DATA_ROUTES.iter().find(|r| r.name == route)
}
