mod modality;
mod oversampling;

pub use modality::{find_minority_type, ModalitySplit, SEM_FOLDER, TEM_FOLDER};
pub use oversampling::{draw_with_replacement, oversample_count};
