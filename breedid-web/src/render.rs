//! Server-side HTML rendering for the single-page form

use std::fmt::Write;

use breedid_classifier::BreedInfo;

use crate::session::HistoryEntry;

/// Headline shown when the policy rejects a prediction
pub const REJECTION_TITLE: &str = "Image not recognized";

/// Explanation shown under [`REJECTION_TITLE`]
pub const REJECTION_DETAIL: &str =
    "The model is not confident this image shows one of the recognized breeds.";

/// Result panel contents
#[derive(Debug, Clone)]
pub enum ResultView {
    Accepted {
        display_label: String,
        confidence: String,
        info: BreedInfo,
        image_file: String,
    },
    Rejected {
        /// `data:` URI of the upload; nothing is stored for rejected images
        preview: Option<String>,
    },
}

/// Everything the page shows
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Display names of the recognizable breeds (about section)
    pub breeds: Vec<String>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub gallery: Vec<String>,
    pub history: Vec<HistoryEntry>,
}

/// Escape text for HTML element and attribute content
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body {
    font-family: system-ui, -apple-system, sans-serif;
    max-width: 860px;
    margin: 40px auto;
    padding: 20px;
    background-color: #121212;
    color: #ffffff;
    line-height: 1.6;
}
.title { text-align: center; font-size: 36px; color: #4F8BF9; font-weight: bold; }
.subtitle { text-align: center; font-size: 18px; color: #cccccc; }
.footer { text-align: center; font-size: 14px; color: #999999; margin-top: 30px; }
.upload {
    border: 2px dashed #4F8BF9;
    background-color: #1e1e1e;
    border-radius: 10px;
    padding: 20px;
}
.upload button {
    background-color: #4F8BF9;
    color: white;
    font-weight: bold;
    border: none;
    border-radius: 8px;
    padding: 8px 18px;
    cursor: pointer;
}
.card {
    background-color: #1e1e1e;
    padding: 20px;
    border-left: 5px solid #4F8BF9;
    border-radius: 10px;
    margin-top: 20px;
}
.success { color: #7ee787; font-size: 20px; }
.error { color: #ff7b72; font-size: 20px; }
.metric { font-size: 28px; font-weight: bold; }
.gallery { display: flex; gap: 10px; }
.gallery img { width: 18%; border-radius: 6px; object-fit: cover; }
.history-item { padding: 10px; background-color: #1e1e1e; border-radius: 8px; margin-bottom: 10px; }
.accent { color: #4F8BF9; }
.info { color: #9ecbff; }
#busy { display: none; color: #cccccc; }
"#;

/// Render the complete page
pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Dog Breed Classifier</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<div class=\"title\">Dog Breed Classifier</div>\n");
    html.push_str(
        "<div class=\"subtitle\">Upload a photo of a dog and let the model predict its breed.</div>\n<hr>\n",
    );

    render_about(&mut html, &view.breeds);
    render_form(&mut html);

    if let Some(error) = &view.error {
        let _ = write!(
            html,
            "<div class=\"card\"><p class=\"error\">{}</p></div>\n",
            escape_html(error)
        );
    }

    if let Some(result) = &view.result {
        render_result(&mut html, result);
    }

    render_gallery(&mut html, &view.gallery);
    render_history(&mut html, &view.history);

    let _ = write!(
        html,
        "<div class=\"footer\">breedid v{}</div>\n",
        env!("CARGO_PKG_VERSION")
    );
    html.push_str(
        "<script>document.getElementById('upload-form').addEventListener('submit', function () {\n\
         document.getElementById('busy').style.display = 'block';\n});</script>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn render_about(html: &mut String, breeds: &[String]) {
    html.push_str("<h2>About</h2>\n");
    html.push_str(
        "<p>This application classifies dog photos with a pretrained convolutional network \
         (MobileNetV2 transfer learning). It recognizes the following breeds:</p>\n<ul>\n",
    );
    for breed in breeds {
        let _ = writeln!(html, "<li>{}</li>", escape_html(breed));
    }
    html.push_str("</ul>\n");
    html.push_str(
        "<h3>How to use</h3>\n<ol>\n\
         <li>Prepare a dog photo in .jpg, .jpeg or .png format.</li>\n\
         <li>Choose the file and press Classify.</li>\n\
         <li>The predicted breed and its confidence are shown below.</li>\n\
         <li>Details about the recognized breed are shown with the result.</li>\n\
         </ol>\n<hr>\n",
    );
}

fn render_form(html: &mut String) {
    html.push_str(
        "<form id=\"upload-form\" class=\"upload\" method=\"post\" action=\"/classify\" \
         enctype=\"multipart/form-data\">\n\
         <label for=\"image\">Upload a dog photo</label><br>\n\
         <input type=\"file\" id=\"image\" name=\"image\" accept=\".jpg,.jpeg,.png\" required>\n\
         <button type=\"submit\">Classify</button>\n\
         <p id=\"busy\">Processing image...</p>\n\
         </form>\n",
    );
}

fn render_result(html: &mut String, result: &ResultView) {
    html.push_str("<h3>Prediction</h3>\n");
    match result {
        ResultView::Accepted {
            display_label,
            confidence,
            info,
            image_file,
        } => {
            let _ = write!(
                html,
                "<img src=\"/gallery/{}\" alt=\"Your image\" style=\"max-width:100%;border-radius:10px\">\n",
                escape_html(image_file)
            );
            let _ = write!(
                html,
                "<p class=\"success\">Prediction: <strong>{}</strong></p>\n",
                escape_html(display_label)
            );
            let _ = write!(
                html,
                "<p>Confidence</p><p class=\"metric\">{}</p>\n",
                escape_html(confidence)
            );
            let _ = write!(
                html,
                "<div class=\"card\">\n\
                 <h4 class=\"accent\">Breed information: {}</h4>\n\
                 <p><strong>Origin:</strong> {}</p>\n\
                 <p><strong>Size:</strong> {}</p>\n\
                 <p><strong>Distinguishing traits:</strong> {}</p>\n\
                 <p><strong>Temperament:</strong> {}</p>\n\
                 <p><strong>Care:</strong> {}</p>\n\
                 </div>\n",
                escape_html(info.name),
                escape_html(info.origin),
                escape_html(info.size),
                escape_html(info.traits),
                escape_html(info.temperament),
                escape_html(info.care),
            );
        }
        ResultView::Rejected { preview } => {
            if let Some(uri) = preview {
                let _ = write!(
                    html,
                    "<img src=\"{}\" alt=\"Your image\" style=\"max-width:100%;border-radius:10px\">\n",
                    escape_html(uri)
                );
            }
            let _ = write!(
                html,
                "<p class=\"error\">{}</p>\n<p>{}</p>\n",
                REJECTION_TITLE, REJECTION_DETAIL
            );
        }
    }
}

fn render_gallery(html: &mut String, files: &[String]) {
    html.push_str("<h3>Gallery</h3>\n");
    if files.is_empty() {
        html.push_str("<p class=\"info\">No images in the gallery yet.</p>\n");
        return;
    }
    html.push_str("<div class=\"gallery\">\n");
    for file in files {
        let name = escape_html(file);
        let _ = writeln!(html, "<img src=\"/gallery/{}\" alt=\"{}\">", name, name);
    }
    html.push_str("</div>\n");
}

fn render_history(html: &mut String, entries: &[HistoryEntry]) {
    html.push_str("<h3>Classification history</h3>\n");
    if entries.is_empty() {
        html.push_str("<p class=\"info\">No classifications yet.</p>\n");
        return;
    }
    for entry in entries {
        let _ = write!(
            html,
            "<div class=\"history-item\">\n\
             <strong>{}</strong><br>\n\
             <em>{}</em><br>\n\
             <strong class=\"accent\">{}</strong><br>\n\
             Confidence: <strong>{}</strong>\n\
             </div>\n",
            escape_html(&entry.timestamp),
            escape_html(&entry.file_name()),
            escape_html(&entry.label),
            escape_html(&entry.confidence),
        );
    }
}
