/// Fixed card copy: every string the card can show.
///
/// All lists are read by index (`n % len`) and never mutated.
/// Status templates may contain `{attempt}`, replaced by the attempt number.

/// Rejections before the card gives up and says yes on the reader's behalf.
pub const MAX_ATTEMPTS: u32 = 6;

/// Growth of the "Yes" control per rejection.
pub const SCALE_STEP: f64 = 0.15;

pub struct Script {
    pub initial_reject_label: &'static str,
    pub accept_label: &'static str,
    pub question: &'static str,
    pub reactions: &'static [&'static str],
    pub errors: &'static [&'static str],
    pub status: &'static [&'static str],
    pub swapped: &'static str,
    pub restored: &'static str,
    pub max_exceeded: &'static str,
    pub auto_selecting: &'static str,
    pub jokes: &'static [&'static str],
    pub sign_off: &'static str,
    pub heart_symbols: &'static [&'static str],
    pub backdrop_symbols: &'static [&'static str],
}

pub const DEFAULT: Script = Script {
    initial_reject_label: "No 😐",
    accept_label: "Yes 💖",
    question: "Will you be my Valentine?",
    reactions: &[
        "Nice try 😏",
        "Nope!",
        "Not happening 🙅",
        "Think again!",
        "Catch me! 🏃‍♂️",
        "Too slow!",
        "Lol no 😂",
        "Almost!",
    ],
    errors: &[
        "Error 403: Permission to say 'No' denied. 🚫",
        "TypeError: 'No' is not a valid response. Expected: 'Yes' | 'Absolutely' | 'Of course'",
        "FATAL: rejection.exe has stopped working. Windows is searching for a solution... 💀",
        "WARNING: Clicking 'No' may cause irreversible sadness. Proceed? (just kidding, you can't)",
        "Error 418: I'm a teapot. Also, 'No' is not in my vocabulary. ☕",
        "BSOD: Blue Screen of Denial — your rejection has been rejected.",
        "npm ERR! ERESOLVE unable to resolve 'no' to a valid emotion",
        "Segfault: attempted to access forbidden memory region 'rejection_zone'",
    ],
    status: &[
        "❌ Rejection attempt #{attempt} failed.",
        "🔍 Searching for 'No' handler... not found.",
        "💔 Error: Cannot break heart. Permission denied.",
        "📊 Rejection rate: 0% (hardcoded)",
        "🔧 Attempting to patch rejection module... patch rejected.",
    ],
    swapped: "🔀 Buttons swapped. Oops, dev bug! 😅",
    restored: "🐛 Button positions corrupted. Not a bug, it's a feature.",
    max_exceeded: "⚠️ Maximum rejection attempts exceeded.",
    auto_selecting: "🔄 Auto-selecting 'Yes'...",
    jokes: &[
        "💾 Valentine status: CONFIRMED",
        "🔒 Rollback: DISABLED",
        "🚫 404: Rejection not found",
        "✅ git commit -m 'added valentine'",
        "📦 Deploying love to production...",
        "⚡ Relationship.exe running smoothly",
    ],
    sign_off: "Happy Valentine's Day! 💕",
    heart_symbols: &["💖", "💕", "💗", "💓", "❤️", "🌹", "✨", "💘"],
    backdrop_symbols: &["💖", "💕", "🌹", "💗"],
};

impl Script {
    pub fn reaction(&self, attempt: u32) -> &'static str {
        cycle(self.reactions, attempt)
    }

    /// Index into `errors` used for a given attempt.
    pub fn error_index(&self, attempt: u32) -> usize {
        attempt as usize % self.errors.len()
    }

    pub fn error(&self, attempt: u32) -> &'static str {
        self.errors[self.error_index(attempt)]
    }

    pub fn status(&self, attempt: u32) -> String {
        cycle(self.status, attempt).replace("{attempt}", &attempt.to_string())
    }
}

fn cycle(list: &'static [&'static str], n: u32) -> &'static str {
    list[n as usize % list.len()]
}
