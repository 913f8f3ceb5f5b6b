pub(crate) fn convert_verbose_level_to_log_level(verbose_level: u8) -> log::LevelFilter {
    // 0 is info (startup banner and chatbox lines), 1 is debug, 2+ is trace
    match verbose_level {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
