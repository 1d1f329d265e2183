//! Mood catalog of interchangeable background clips.

use rand::seq::IndexedRandom;
use reel_models::Mood;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use url::Url;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "toxic",
        &[
            "https://www.dropbox.com/scl/fi/1d5wkyfmkjfqc2c82u81v/toxic_1.mp4?rlkey=wbfhd7g0sit71kg154ta0wdvf&st=6p0a8roq&dl=1",
            "https://www.dropbox.com/scl/fi/wwriv8a5odi656g2y05gv/toxic_2.mp4?rlkey=kvts8z7uiykaj4vra5m569zy0&st=mah3nq4r&dl=1",
            "https://www.dropbox.com/scl/fi/njmkpxu54gveq1ba6zth2/toxic_3.mp4?rlkey=ushbykoj6h4vd4esjhyu1nm6v&st=9880mq71&dl=1",
            "https://www.dropbox.com/scl/fi/w4gn4yk9ebdqscto4lsyb/toxic_4.mp4?rlkey=ba0far7qnzdzg5q4jojvgxaxb&st=tle45c7a&dl=1",
        ],
    ),
    (
        "reflective",
        &[
            "https://www.dropbox.com/scl/fi/62t2lcv7uy1b8ud4k759b/reflective_1.mp4?rlkey=f3gnq1rrdgb84weuh277gpocb&st=8nq0c89g&dl=1",
            "https://www.dropbox.com/scl/fi/w2dg6wu60eo1uzlq2hud9/reflective_2.mp4?rlkey=7aksj0dizcppq9n9mdsh7cx0b&st=r0pqvq4b&dl=1",
            "https://www.dropbox.com/scl/fi/updtympqwasrqjuyaztjj/reflective_3.mp4?rlkey=rzrv3dya4q9rcb9fzm0djt6el&st=rh02abtj&dl=1",
            "https://www.dropbox.com/scl/fi/5lbv91b55s6b4gyfwx2cw/reflective_4.mp4?rlkey=c4pdcjk0dukftymby02gf2lit&st=4p5mijgz&dl=1",
        ],
    ),
    (
        "emotional",
        &[
            "https://www.dropbox.com/scl/fi/f1d788uchszdgegb4rdno/emotional_1.mp4?rlkey=x1bxhb4lkdpykd8k1eh4ef7kz&st=500l0spj&dl=1",
            "https://www.dropbox.com/scl/fi/qx9f0s4k1s3ho3xmdln8g/emotional_2.mp4?rlkey=0mj0ky3d220vl8ktgr67c18t6&st=fyd4qpmf&dl=1",
            "https://www.dropbox.com/scl/fi/7i9iv1a7o7l64s356jw58/emotional_3.mp4?rlkey=nuucpgcf73wwsxfwn0uhxvpjf&st=qit4rdvo&dl=1",
            "https://www.dropbox.com/scl/fi/ey5rztxydsc8u4tn32vzb/emotional_4.mp4?rlkey=j42uh4syq22usnffc1tsykjko&st=csm7qdmq&dl=1",
        ],
    ),
    (
        "dramatic",
        &[
            "https://www.dropbox.com/scl/fi/ot5f23dg5it8lrkcr0zpw/dramatic_1.mp4?rlkey=4twzcl6a6ro9881yjah35hwrs&st=vav2ndez&dl=1",
            "https://www.dropbox.com/scl/fi/w6bnjmx5qy3rmdv9tsq60/dramatic_2.mp4?rlkey=z1zea0ubguy1t7w9wkbify2gz&st=6srstjau&dl=1",
            "https://www.dropbox.com/scl/fi/25hql0yxs5xug5t4mipde/dramatic_3.mp4?rlkey=1xseyzeosb23byxyygxcz19r8&st=8wbl19bm&dl=1",
            "https://www.dropbox.com/scl/fi/tlv5gas2gqa4ql8j99xx4/dramatic_4.mp4?rlkey=7efikosn98a5laggm2zoc2cfe&st=am9n6nqe&dl=1",
        ],
    ),
];

/// Mood to background-clip URIs. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct MoodCatalog {
    entries: BTreeMap<Mood, Vec<String>>,
}

impl MoodCatalog {
    /// The four stock moods with four clips each.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(mood, uris)| (Mood::new(mood), uris.iter().map(|u| u.to_string()).collect()))
            .collect();
        Self { entries }
    }

    /// Build from `mood -> [uri, ...]` pairs, validating every entry.
    ///
    /// Mood keys are normalized; moods with no clips are rejected rather
    /// than silently dropped.
    pub fn from_entries<I>(entries: I) -> WorkerResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut catalog = BTreeMap::new();
        for (raw_mood, uris) in entries {
            let mood = Mood::new(&raw_mood);
            if mood.as_str().is_empty() {
                return Err(WorkerError::config_error("catalog contains an empty mood key"));
            }
            if uris.is_empty() {
                return Err(WorkerError::config_error(format!("mood '{mood}' has no clips")));
            }
            for uri in &uris {
                Url::parse(uri).map_err(|e| {
                    WorkerError::config_error(format!("mood '{mood}' has invalid URI '{uri}': {e}"))
                })?;
            }
            catalog.entry(mood).or_insert_with(Vec::new).extend(uris);
        }
        if catalog.is_empty() {
            return Err(WorkerError::config_error("catalog defines no moods"));
        }
        Ok(Self { entries: catalog })
    }

    /// Parse a JSON object mapping mood names to URI lists.
    pub fn from_json_str(raw: &str) -> WorkerResult<Self> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)
            .map_err(|e| WorkerError::config_error(format!("invalid catalog JSON: {e}")))?;
        Self::from_entries(parsed)
    }

    pub fn from_file(path: &Path) -> WorkerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WorkerError::config_error(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// The configured catalog file, or the built-in one.
    pub fn load(config: &WorkerConfig) -> WorkerResult<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Self::from_file(path)?,
            None => Self::builtin(),
        };
        info!(moods = ?catalog.moods().collect::<Vec<_>>(), "mood catalog loaded");
        Ok(catalog)
    }

    pub fn contains(&self, mood: &Mood) -> bool {
        self.entries.contains_key(&Mood::new(mood.as_str()))
    }

    pub fn candidates(&self, mood: &Mood) -> Option<&[String]> {
        self.entries.get(&Mood::new(mood.as_str())).map(Vec::as_slice)
    }

    /// Pick one clip for `mood` uniformly at random.
    pub fn choose(&self, mood: &Mood) -> WorkerResult<&str> {
        self.candidates(mood)
            .and_then(|uris| uris.choose(&mut rand::rng()))
            .map(String::as_str)
            .ok_or_else(|| WorkerError::UnknownMood(mood.to_string()))
    }

    pub fn moods(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(Mood::as_str)
    }
}

impl Default for MoodCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
