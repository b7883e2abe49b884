fn main() {
    maps_cgi::run("loadmap", maps_cgi::load_map)
}
