use crate::PatchError;

/// Returns a new sequence created by patching the diff into the previous one.
///
/// The diff consists of alternating matching and mismatching runs:
///
/// 1. the number of elements to copy over from `previous`,
/// 2. the number of elements that are new,
/// 3. the new elements themselves,
///
/// repeated until the end of the diff. Either count may be zero.
///
/// For example, patching `[1, 1, 3]` onto `[0, 0]` yields `[0, 3]`, and
/// patching `[0, 1, 2, 1]` onto `[0, 0]` yields `[2, 0]`.
///
/// A run that reaches past the end of `previous` or of the diff itself is
/// an error, as is a negative run length. The output is never truncated.
pub fn patch(previous: &[i32], diff: &[i32]) -> Result<Vec<i32>, PatchError> {
    let mut out = Vec::with_capacity(previous.len());
    let mut i = 0;
    while i < diff.len() {
        let matching = run_length(diff, i)?;
        if matching > 0 {
            let start = out.len();
            let end = start.saturating_add(matching);
            let run = previous
                .get(start..end)
                .ok_or(PatchError::MatchOutOfRange {
                    position: i,
                    end,
                    previous_len: previous.len(),
                })?;
            out.extend_from_slice(run);
        }
        i += 1;
        if i < diff.len() {
            let mismatching = run_length(diff, i)?;
            if mismatching > 0 {
                let end = (i + 1).saturating_add(mismatching);
                let literals = diff
                    .get(i + 1..end)
                    .ok_or(PatchError::LiteralOutOfRange {
                        position: i,
                        end,
                        diff_len: diff.len(),
                    })?;
                out.extend_from_slice(literals);
                i += mismatching;
            }
        }
        i += 1;
    }
    Ok(out)
}

fn run_length(diff: &[i32], position: usize) -> Result<usize, PatchError> {
    let value = diff[position];
    usize::try_from(value).map_err(|_| PatchError::NegativeRunLength { position, value })
}
