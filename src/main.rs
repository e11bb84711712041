fn main() -> anyhow::Result<()> {
    uav_doe::app::run()
}
