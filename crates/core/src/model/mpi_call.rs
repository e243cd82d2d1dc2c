//! MPI call descriptors decoded from raw records, consumed by the matcher.

/// Wildcard source rank, equivalent to `MPI_ANY_SOURCE`. Distinct from
/// [`ANY_TAG`] by design -- a recorded `src`/`tag` of `-1`/`-2` is
/// unambiguous even when compared against the wrong field.
pub const ANY_SOURCE: i64 = -1;

/// Wildcard tag, equivalent to `MPI_ANY_TAG`.
pub const ANY_TAG: i64 = -2;

/// One decoded MPI call. Which fields are meaningful depends on
/// `name`: point-to-point calls populate `comm`/`dst`-or-`src`/`stag`-or-`rtag`;
/// collectives populate `comm` and, for one-to-many/many-to-one shapes,
/// `src` (the root's local rank in `comm`); file-collectives populate
/// `mpifh` instead of `comm`; wait/test calls populate `reqs`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MpiCall {
    pub rank: u32,
    pub seq_id: u64,
    pub name: String,
    pub comm: Option<String>,
    pub mpifh: Option<String>,
    /// Local rank, within `comm`, of the send side / collective root.
    pub src: Option<i64>,
    /// Local rank, within `comm`, of the receive side.
    pub dst: Option<i64>,
    pub stag: i64,
    pub rtag: i64,
    pub reqs: Vec<String>,
}

impl MpiCall {
    #[must_use]
    pub fn new(rank: u32, seq_id: u64, name: String) -> Self {
        Self {
            rank,
            seq_id,
            name,
            stag: 0,
            rtag: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.name.starts_with("MPI_I")
    }

    #[must_use]
    pub fn is_send(&self) -> bool {
        matches!(self.name.as_str(), "MPI_Send" | "MPI_Ssend" | "MPI_Issend" | "MPI_Isend" | "MPI_Sendrecv")
    }

    #[must_use]
    pub fn is_recv(&self) -> bool {
        matches!(self.name.as_str(), "MPI_Recv" | "MPI_Irecv" | "MPI_Sendrecv")
    }

    #[must_use]
    pub fn is_wait_or_test(&self) -> bool {
        self.name.starts_with("MPI_Wait") || self.name.starts_with("MPI_Test")
    }

    /// The `func_name ";" comm ";" mpifh` key used to bucket matching
    /// collective calls together (spec.md §4.3).
    #[must_use]
    pub fn get_key(&self) -> String {
        format!(
            "{};{};{}",
            self.name,
            self.comm.as_deref().unwrap_or(""),
            self.mpifh.as_deref().unwrap_or("")
        )
    }
}
