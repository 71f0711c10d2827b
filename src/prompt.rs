use crossterm::style::Stylize;

/// Render the prompt: `username clock:cwd$ `.
///
/// Lookup failures degrade to placeholders instead of erroring — the
/// prompt must always render, whatever state the environment is in.
pub fn render() -> String {
    let user = std::env::var("USER").unwrap_or_else(|_| "root".to_string());
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    match clock() {
        Some(now) => format!("{} {}:{}$ ", user.green(), now, cwd.blue()),
        None => format!("{} {}$ ", user.green(), cwd.blue()),
    }
}

/// Local time as `%b %d %H:%M:%S`, e.g. `Aug 06 09:15:42`.
#[cfg(unix)]
fn clock() -> Option<String> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    // SAFETY: localtime_r only writes into the tm buffer we hand it.
    let tm = unsafe {
        let now = libc::time(std::ptr::null_mut());
        let mut tm: libc::tm = std::mem::zeroed();
        if libc::localtime_r(&now, &mut tm).is_null() {
            return None;
        }
        tm
    };

    let month = MONTHS.get(tm.tm_mon as usize)?;
    Some(format!(
        "{month} {:02} {:02}:{:02}:{:02}",
        tm.tm_mday, tm.tm_hour, tm.tm_min, tm.tm_sec
    ))
}

#[cfg(not(unix))]
fn clock() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_dollar() {
        assert!(render().ends_with("$ "));
    }

    #[cfg(unix)]
    #[test]
    fn clock_has_month_day_and_time() {
        let now = clock().expect("clock renders on unix");
        let parts: Vec<&str> = now.split(' ').collect();
        assert_eq!(parts.len(), 3, "clock was: {now}");
        assert_eq!(parts[2].split(':').count(), 3, "clock was: {now}");
    }
}
