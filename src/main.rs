fn main() -> anyhow::Result<()> {
    glow_glyphs::flow::run()
}
