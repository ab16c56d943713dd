use nafer_core::{report::render_list, storage::FeedStore};

pub fn run(store: &FeedStore) {
    for line in render_list(store) {
        println!("{}", line);
    }
}
