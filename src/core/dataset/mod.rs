mod assembler;
mod naming;
mod ordering;
mod writer;

pub use assembler::{
    load_patch_folder, patched_to_dataset, AssemblyMode, AssemblySummary, DatasetType,
    FolderReport,
};
pub use naming::{PatchKind, PatchName, PATCH_EXTENSION};
pub use ordering::{pair_sorted, sort_by_index, TilePair};
pub use writer::DatasetWriter;
