use foot_measure::tools::{batch_limit_from_env, dataset_iter, dataset_root_from_env};
use std::path::PathBuf;

#[allow(dead_code)]
pub fn collect_dataset_images() -> (PathBuf, Vec<PathBuf>) {
    let root = dataset_root_from_env();
    let limit = batch_limit_from_env();

    let images: Vec<PathBuf> = dataset_iter(&root, limit).collect();
    (root, images)
}
