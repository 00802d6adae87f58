fn main() {
    replay_timeline_lib::run()
}
