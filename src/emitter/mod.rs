pub mod formatter;
pub mod writer;

pub use writer::{
    chunk_file_path, generate_output_stem, output_path_to_stem, single_file_path, EmitMode,
    EmitOutcome, Emitter,
};
