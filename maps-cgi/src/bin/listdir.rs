//! Lists a directory below the served root, used by the js builder to find
//! source files.

fn main() {
    maps_cgi::run("listdir", maps_cgi::list_dir)
}
