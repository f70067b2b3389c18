//! Keyed-archive resolution on top of the binary plist reader.
//!
//! An archive is a dict with `$objects` (the flattened object table) and
//! `$top` (named entry points as UIDs into `$objects`). Only the string
//! bearing classes of a rich-text payload are understood.

use crate::decode::DecodeError;
use crate::plist::{BinaryPlist, PlistObject};
use crate::plist_writer::{write_binary_plist, PlistValue};

const ARCHIVER: &str = "NSKeyedArchiver";
const STRING_CLASSES: [&str; 4] = [
    "NSString",
    "NSMutableString",
    "NSAttributedString",
    "NSMutableAttributedString",
];
const STRING_KEYS: [&str; 2] = ["NSString", "NS.string"];
const MAX_DEPTH: usize = 8;

pub fn decode_keyed_archive(data: &[u8]) -> Result<String, DecodeError> {
    let plist = BinaryPlist::parse(data)?;
    let PlistObject::Dict(top) = plist.object(plist.top_index())? else {
        return Err(DecodeError::NotKeyedArchive("top object is not a dict"));
    };

    if let Some(index) = plist.dict_get(&top, "$archiver")? {
        match plist.object(index)? {
            PlistObject::String(name) if name == ARCHIVER => {}
            _ => return Err(DecodeError::NotKeyedArchive("unexpected $archiver")),
        }
    }

    let objects = match plist.dict_get(&top, "$objects")? {
        Some(index) => match plist.object(index)? {
            PlistObject::Array(items) => items,
            _ => return Err(DecodeError::NotKeyedArchive("$objects is not an array")),
        },
        None => return Err(DecodeError::NotKeyedArchive("missing $objects")),
    };

    let entries = match plist.dict_get(&top, "$top")? {
        Some(index) => match plist.object(index)? {
            PlistObject::Dict(entries) => entries,
            _ => return Err(DecodeError::NotKeyedArchive("$top is not a dict")),
        },
        None => return Err(DecodeError::NotKeyedArchive("missing $top")),
    };

    let root = match plist.dict_get(&entries, "root")? {
        Some(index) => index,
        None => entries.first().map(|&(_, value)| value).ok_or(DecodeError::MissingRoot)?,
    };
    let PlistObject::Uid(uid) = plist.object(root)? else {
        return Err(DecodeError::MissingRoot);
    };

    Archive {
        plist: &plist,
        objects: &objects,
    }
    .string_for(uid, 0)
}

struct Archive<'p, 'a> {
    plist: &'p BinaryPlist<'a>,
    objects: &'p [usize],
}

impl Archive<'_, '_> {
    fn resolve(&self, uid: u64) -> Result<PlistObject<'_>, DecodeError> {
        let index = usize::try_from(uid)
            .ok()
            .and_then(|uid| self.objects.get(uid))
            .ok_or(DecodeError::DanglingUid(uid))?;
        Ok(self.plist.object(*index)?)
    }

    fn string_for(&self, uid: u64, depth: usize) -> Result<String, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::ReferenceDepth);
        }
        // Slot 0 is always the `$null` marker.
        if uid == 0 {
            return Err(DecodeError::UnsupportedClass("$null".to_string()));
        }
        match self.resolve(uid)? {
            PlistObject::String(text) => Ok(text),
            PlistObject::Dict(entries) => {
                let class = self.class_name(&entries)?;
                if !STRING_CLASSES.contains(&class.as_str()) {
                    return Err(DecodeError::UnsupportedClass(class));
                }
                for key in STRING_KEYS {
                    let Some(index) = self.plist.dict_get(&entries, key)? else {
                        continue;
                    };
                    return match self.plist.object(index)? {
                        PlistObject::Uid(next) => self.string_for(next, depth + 1),
                        PlistObject::String(text) => Ok(text),
                        other => Err(DecodeError::UnsupportedClass(other.kind().to_string())),
                    };
                }
                Err(DecodeError::UnsupportedClass(class))
            }
            other => Err(DecodeError::UnsupportedClass(other.kind().to_string())),
        }
    }

    fn class_name(&self, entries: &[(usize, usize)]) -> Result<String, DecodeError> {
        let missing = || DecodeError::UnsupportedClass("<unnamed>".to_string());
        let index = self.plist.dict_get(entries, "$class")?.ok_or_else(missing)?;
        let PlistObject::Uid(class_uid) = self.plist.object(index)? else {
            return Err(missing());
        };
        let PlistObject::Dict(class) = self.resolve(class_uid)? else {
            return Err(missing());
        };
        let index = self.plist.dict_get(&class, "$classname")?.ok_or_else(missing)?;
        match self.plist.object(index)? {
            PlistObject::String(name) => Ok(name),
            _ => Err(missing()),
        }
    }
}

/// Archive `text` the way a rich-text message body is stored: an
/// `NSAttributedString` root whose `NSString` entry points at the text.
pub fn encode_attributed_string(text: &str) -> Vec<u8> {
    let uid = PlistValue::Uid;
    let objects = vec![
        PlistValue::String("$null".to_string()),
        PlistValue::Dict(vec![
            ("$class".to_string(), uid(3)),
            ("NSString".to_string(), uid(2)),
            ("NSAttributes".to_string(), uid(4)),
        ]),
        PlistValue::String(text.to_string()),
        class_entry("NSAttributedString"),
        PlistValue::Dict(vec![
            ("$class".to_string(), uid(5)),
            ("NS.keys".to_string(), PlistValue::Array(Vec::new())),
            ("NS.objects".to_string(), PlistValue::Array(Vec::new())),
        ]),
        class_entry("NSDictionary"),
    ];

    write_binary_plist(&PlistValue::Dict(vec![
        ("$version".to_string(), PlistValue::Integer(100_000)),
        ("$archiver".to_string(), PlistValue::String(ARCHIVER.to_string())),
        (
            "$top".to_string(),
            PlistValue::Dict(vec![("root".to_string(), uid(1))]),
        ),
        ("$objects".to_string(), PlistValue::Array(objects)),
    ]))
}

fn class_entry(name: &str) -> PlistValue {
    PlistValue::Dict(vec![
        ("$classname".to_string(), PlistValue::String(name.to_string())),
        (
            "$classes".to_string(),
            PlistValue::Array(vec![
                PlistValue::String(name.to_string()),
                PlistValue::String("NSObject".to_string()),
            ]),
        ),
    ])
}
