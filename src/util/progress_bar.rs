use indicatif::{ProgressBar, ProgressStyle};

use crate::consts;

pub fn progress_callback(filename: String, length: u64) -> Box<dyn Fn(u64)> {
    let pb = ProgressBar::new(length).with_message(filename);
    if let Ok(style) = ProgressStyle::with_template(consts::PROGRESS_STYLE) {
        pb.set_style(style);
    }
    Box::new(move |downloaded| {
        if !pb.is_finished() {
            pb.set_position(downloaded);
            if length <= downloaded {
                pb.finish_and_clear();
            }
        }
    })
}
