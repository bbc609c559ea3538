mod file_ops;

pub use file_ops::{
    count_files_recursive, ensure_dir, list_files, list_subdirs, read_gray, save_gray,
};
