//! Display cards for a user's uploads.

use crate::UploadSummary;

pub const EMPTY_GALLERY_MESSAGE: &str =
    "No files uploaded yet. Upload your first file to get started!";
pub const UNKNOWN_SIZE: &str = "Unknown size";
pub const UNKNOWN_DATE: &str = "Unknown date";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    pub fn from_mime(file_type: Option<&str>) -> Self {
        match file_type {
            Some(t) if t.starts_with("image/") => MediaKind::Image,
            Some(t) if t.starts_with("video/") => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Image { src: String },
    Video { src: String },
    Generic,
    /// Shown in place of an image or video that failed to load
    Error { kind: MediaKind },
}

/// "Open in a new browsing context" action for a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAction {
    pub url: String,
    pub new_context: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCard {
    pub title: String,
    pub preview: Preview,
    pub size_label: String,
    pub date_label: String,
    pub open: OpenAction,
}

impl GalleryCard {
    /// Swap this card's media preview for the error placeholder.
    pub fn preview_failed(&mut self) {
        let kind = match self.preview {
            Preview::Image { .. } => MediaKind::Image,
            Preview::Video { .. } => MediaKind::Video,
            Preview::Generic | Preview::Error { .. } => return,
        };
        self.preview = Preview::Error { kind };
    }
}

pub fn size_label(file_size: Option<i64>) -> String {
    match file_size {
        Some(bytes) if bytes > 0 => format!("{:.2} MB", bytes as f64 / BYTES_PER_MB),
        _ => UNKNOWN_SIZE.to_string(),
    }
}

fn card(upload: &UploadSummary) -> GalleryCard {
    let preview = match MediaKind::from_mime(upload.file_type.as_deref()) {
        MediaKind::Image => Preview::Image {
            src: upload.s3_url.clone(),
        },
        MediaKind::Video => Preview::Video {
            src: upload.s3_url.clone(),
        },
        MediaKind::Other => Preview::Generic,
    };

    GalleryCard {
        title: upload.file_name.clone(),
        preview,
        size_label: size_label(upload.file_size),
        date_label: upload
            .uploaded_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        open: OpenAction {
            url: upload.s3_url.clone(),
            new_context: true,
        },
    }
}

/// One card per upload, in listing order.
pub fn render_gallery(uploads: &[UploadSummary]) -> Vec<GalleryCard> {
    uploads.iter().map(card).collect()
}

/// Plain-text rendering used by the CLI.
pub fn render_text(cards: &[GalleryCard]) -> String {
    if cards.is_empty() {
        return EMPTY_GALLERY_MESSAGE.to_string();
    }

    cards
        .iter()
        .map(|card| {
            let kind = match &card.preview {
                Preview::Image { .. } => "image",
                Preview::Video { .. } => "video",
                Preview::Generic => "file",
                Preview::Error { .. } => "preview error",
            };
            format!(
                "{}  [{}]  {}  {}  {}",
                card.title, kind, card.size_label, card.date_label, card.open.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
