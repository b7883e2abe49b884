//! Saves the `data` field of a form submission as the map `name`.
//!
//! ```sh
//! curl localhost:8000/cgi-bin/savemap -d name=level1.map -d data=2[1,2,3]
//! ```

fn main() {
    maps_cgi::run("savemap", maps_cgi::save_map)
}
