//! Line assembly across reads that may end mid-line.

/// Upper bound for a carried-over partial line. Anything longer is not a
/// chat line and is discarded.
const MAX_PENDING: usize = 64 * 1024;

/// Splits appended bytes into complete lines, holding back the trailing
/// fragment until its newline arrives.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Feed freshly read bytes and return the lines they completed.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            self.enforce_cap();
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        self.enforce_cap();

        complete
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    fn enforce_cap(&mut self) {
        if self.pending.len() > MAX_PENDING {
            tracing::warn!(len = self.pending.len(), "discarding oversized partial line");
            self.pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_complete_lines_only() {
        let mut buffer = LineBuffer::default();
        assert_eq!(buffer.push(b"one\ntwo\nthr"), vec!["one", "two"]);
        assert_eq!(buffer.push(b"ee\n"), vec!["three"]);
    }

    #[test]
    fn should_strip_carriage_returns() {
        let mut buffer = LineBuffer::default();
        assert_eq!(buffer.push(b"windows\r\n"), vec!["windows"]);
    }

    #[test]
    fn should_reassemble_multibyte_text_split_mid_character() {
        let mut buffer = LineBuffer::default();
        let line = "У вас выбили оружие из рук!\n".as_bytes();
        // Cut inside the two-byte encoding of the first letter.
        assert!(buffer.push(&line[..1]).is_empty());
        assert_eq!(buffer.push(&line[1..]), vec!["У вас выбили оружие из рук!"]);
    }

    #[test]
    fn should_forget_fragment_on_clear() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"stale fragment");
        buffer.clear();
        assert_eq!(buffer.push(b"fresh\n"), vec!["fresh"]);
    }

    #[test]
    fn should_drop_oversized_fragment() {
        let mut buffer = LineBuffer::default();
        buffer.push(&vec![b'x'; MAX_PENDING + 1]);
        assert_eq!(buffer.push(b"ok\n"), vec!["ok"]);
    }
}
