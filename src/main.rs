fn main() -> color_eyre::Result<()> {
    bytelens::run()
}
