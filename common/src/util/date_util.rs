pub fn now() -> i64 {
    chrono::Local::now().timestamp()
}
