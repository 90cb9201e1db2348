use rand::seq::SliceRandom;
use rand::Rng;

/// Generates a plausible desktop user-agent string.
///
/// Each session keeps the string it drew for its whole lifetime so every
/// request from one wallet presents the same synthetic identity.
pub fn generate_user_agent() -> String {
    let platforms = [
        "Windows NT 10.0; Win64; x64",
        "Macintosh; Intel Mac OS X 10_15_7",
        "X11; Linux x86_64",
    ];

    let mut rng = rand::thread_rng();
    let platform = platforms.choose(&mut rng).unwrap();

    if rng.gen_bool(0.7) {
        let major = rng.gen_range(120..=131);
        format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36",
            platform, major
        )
    } else {
        let major = rng.gen_range(121..=133);
        format!(
            "Mozilla/5.0 ({}; rv:{}.0) Gecko/20100101 Firefox/{}.0",
            platform, major, major
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_like_a_desktop_browser() {
        for _ in 0..50 {
            let ua = generate_user_agent();
            assert!(ua.starts_with("Mozilla/5.0 ("));
            assert!(ua.contains("Chrome/") || ua.contains("Firefox/"));
        }
    }
}
