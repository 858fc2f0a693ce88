use std::fs::File;

include!("src/cli.rs");

fn main() {
    println!("cargo:rerun-if-changed=src/cli.rs");
    let mut file = File::create("USAGE").unwrap();
    app().write_help(&mut file).unwrap();
}
