fn main() {
    teadiary_lib::run()
}
