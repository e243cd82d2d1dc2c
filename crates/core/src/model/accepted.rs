//! Function-name sets the node extractor and matcher key behavior off of.

/// Messaging and collective calls the node extractor keeps.
pub const MESSAGING_FUNCS: &[&str] = &[
    "MPI_Send",
    "MPI_Ssend",
    "MPI_Issend",
    "MPI_Isend",
    "MPI_Recv",
    "MPI_Sendrecv",
    "MPI_Irecv",
    "MPI_Wait",
    "MPI_Waitall",
    "MPI_Waitany",
    "MPI_Waitsome",
    "MPI_Test",
    "MPI_Testall",
    "MPI_Testany",
    "MPI_Testsome",
    "MPI_Bcast",
    "MPI_Ibcast",
    "MPI_Reduce",
    "MPI_Ireduce",
    "MPI_Gather",
    "MPI_Gatherv",
    "MPI_Igather",
    "MPI_Igatherv",
    "MPI_Barrier",
    "MPI_Alltoall",
    "MPI_Allreduce",
    "MPI_Allgatherv",
    "MPI_Reduce_scatter",
    "MPI_File_open",
    "MPI_File_close",
    "MPI_File_read_at_all",
    "MPI_File_write_at_all",
    "MPI_File_set_size",
    "MPI_File_set_view",
    "MPI_File_sync",
    "MPI_File_read_all",
    "MPI_File_read_ordered",
    "MPI_File_write_all",
    "MPI_File_write_ordered",
    "MPI_Comm_dup",
    "MPI_Comm_split",
    "MPI_Comm_split_type",
    "MPI_Cart_create",
    "MPI_Cart_sub",
];

/// Metadata I/O calls the node extractor keeps.
pub const METADATA_FUNCS: &[&str] = &["fsync", "open", "fopen", "close", "fclose"];

/// Broadcast-shaped collectives: one root fans out to all participants.
pub const BCAST_FUNCS: &[&str] = &["MPI_Bcast", "MPI_Ibcast"];

/// Reduce/gather-shaped collectives: all participants feed one root.
pub const REDGAT_FUNCS: &[&str] = &[
    "MPI_Reduce",
    "MPI_Ireduce",
    "MPI_Gather",
    "MPI_Gatherv",
    "MPI_Igather",
    "MPI_Igatherv",
];

/// All-to-all-shaped collectives with MPI-standard synchronization
/// semantics: every participant fences against every other.
pub const ALLTOALL_SYNC_FUNCS: &[&str] = &[
    "MPI_Barrier",
    "MPI_Allgather",
    "MPI_Allgatherv",
    "MPI_Alltoall",
    "MPI_Alltoallv",
    "MPI_Alltoallw",
    "MPI_Allreduce",
    "MPI_Reduce_scatter",
];

/// Calls treated as all-to-all fences only when `mpi_sync_calls` is
/// false: file-collectives and communicator-creation calls. Per
/// spec.md §4.3, these additionally populate the all-to-all set
/// alongside [`ALLTOALL_SYNC_FUNCS`] under that configuration.
pub const ALLTOALL_NONSYNC_FUNCS: &[&str] = &[
    "MPI_File_read_at_all",
    "MPI_File_write_at_all",
    "MPI_File_read_all",
    "MPI_File_read_ordered",
    "MPI_File_write_all",
    "MPI_File_write_ordered",
    "MPI_Comm_dup",
    "MPI_Comm_split",
    "MPI_Comm_split_type",
    "MPI_Cart_create",
    "MPI_Cart_sub",
];

#[must_use]
pub fn is_accepted(name: &str) -> bool {
    MESSAGING_FUNCS.contains(&name) || METADATA_FUNCS.contains(&name)
}

#[must_use]
pub fn is_metadata_io(name: &str) -> bool {
    METADATA_FUNCS.contains(&name)
}

#[must_use]
pub fn is_mpi_file(name: &str) -> bool {
    name.starts_with("MPI_File")
}

/// Whether argument 0 of a record for `name` is a file-handle-like
/// value the extractor should record as `file_handle`.
#[must_use]
pub fn has_file_handle_arg0(name: &str) -> bool {
    is_mpi_file(name) || is_metadata_io(name)
}
