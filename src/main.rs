fn main() {
    star_jar_lib::run()
}
