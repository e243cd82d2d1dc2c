//! Decodes a raw [`Record`] into an [`MpiCall`], mirroring each MPI
//! function's accepted argument layout.

use crate::model::mpi_call::MpiCall;
use crate::model::record::Record;

fn parse_req_list(raw: &str) -> Vec<String> {
    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decodes `record` (whose function is `name`) into an [`MpiCall`].
/// Unrecognized function names still produce a call shell with no
/// fields populated, matching the reference's "not found in
/// func_args_map" fallback.
#[must_use]
pub fn decode_call(rank: u32, seq_id: u64, name: &str, record: &Record) -> MpiCall {
    let mut call = MpiCall::new(rank, seq_id, name.to_string());
    let arg = |i: usize| record.arg(i).map(str::to_string);
    let arg_i64 = |i: usize| record.arg(i).and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);

    match name {
        "MPI_Send" | "MPI_Ssend" => {
            call.dst = Some(arg_i64(0));
            call.stag = arg_i64(1);
            call.comm = arg(2);
        }
        "MPI_Issend" | "MPI_Isend" => {
            call.dst = Some(arg_i64(0));
            call.stag = arg_i64(1);
            call.comm = arg(2);
            if let Some(r) = arg(3) {
                call.reqs = vec![r];
            }
        }
        "MPI_Recv" => {
            call.src = Some(arg_i64(0));
            call.rtag = arg_i64(1);
            call.comm = arg(2);
        }
        "MPI_Sendrecv" => {
            call.src = Some(arg_i64(0));
            call.dst = Some(arg_i64(1));
            call.stag = arg_i64(2);
            call.rtag = arg_i64(3);
            call.comm = arg(4);
        }
        "MPI_Irecv" => {
            call.src = Some(arg_i64(0));
            call.rtag = arg_i64(1);
            call.comm = arg(2);
            if let Some(r) = arg(3) {
                call.reqs = vec![r];
            }
        }
        "MPI_Wait" | "MPI_Waitall" | "MPI_Waitany" | "MPI_Waitsome" | "MPI_Test" | "MPI_Testall"
        | "MPI_Testany" | "MPI_Testsome" => {
            call.reqs = arg(0).map(|s| parse_req_list(&s)).unwrap_or_default();
        }
        "MPI_Bcast" | "MPI_Reduce" | "MPI_Gather" | "MPI_Gatherv" => {
            call.src = Some(arg_i64(0));
            call.comm = arg(1);
        }
        "MPI_Ibcast" | "MPI_Ireduce" | "MPI_Igather" | "MPI_Igatherv" => {
            call.src = Some(arg_i64(0));
            call.comm = arg(1);
            if let Some(r) = arg(2) {
                call.reqs = vec![r];
            }
        }
        "MPI_Barrier" | "MPI_Alltoall" | "MPI_Allreduce" | "MPI_Allgatherv" | "MPI_Reduce_scatter"
        | "MPI_Comm_dup" | "MPI_Comm_split" | "MPI_Comm_split_type" | "MPI_Cart_create" | "MPI_Cart_sub" => {
            call.comm = arg(0);
        }
        "MPI_File_open"
        | "MPI_File_close"
        | "MPI_File_read_at_all"
        | "MPI_File_write_at_all"
        | "MPI_File_set_size"
        | "MPI_File_set_view"
        | "MPI_File_sync"
        | "MPI_File_read_all"
        | "MPI_File_read_ordered"
        | "MPI_File_write_all"
        | "MPI_File_write_ordered" => {
            call.mpifh = arg(0);
        }
        _ => {}
    }

    call
}
