//! Invoice rendering.
//!
//! Turns persisted jobs into one paginated PDF: per job a letterhead,
//! client block, item table, total row, and banking boilerplate. Each job
//! starts on a fresh page; a long item table continues across pages with
//! the column header repeated.

use crate::config::CompanyInfo;
use crate::error::RenderError;
use crate::model::{Job, JobItem};

mod pdf;

use pdf::{Font, PageContent, PdfBuilder, PAGE_HEIGHT, PAGE_WIDTH};

/// Deterministic download name for the rendered artifact.
pub const INVOICE_FILENAME: &str = "invoices.pdf";
pub const INVOICE_MIME: &str = "application/pdf";

/// Tolerance when cross-checking the stored total against the recomputed
/// line-item sum. Anything beyond two-decimal rounding is suspicious.
const TOTAL_TOLERANCE: f64 = 0.005;

const MARGIN: f64 = 50.0;
const TOP: f64 = PAGE_HEIGHT - MARGIN;
const BOTTOM: f64 = 60.0;
const ROW_HEIGHT: f64 = 16.0;
const LINE_HEIGHT: f64 = 12.0;
const BODY_SIZE: f64 = 10.0;

// Item table: x positions of Description | Quantity | Price | Total.
const COL_DESC: f64 = 55.0;
const COL_QTY: f64 = 300.0;
const COL_PRICE: f64 = 370.0;
const COL_TOTAL: f64 = 460.0;
const TABLE_LEFT: f64 = MARGIN;
const TABLE_RIGHT: f64 = PAGE_WIDTH - MARGIN;
const DESC_WRAP_CHARS: usize = 46;

/// Formats an amount with the fixed currency prefix and two decimals.
pub fn format_chf(amount: f64) -> String {
    format!("CHF {:.2}", amount)
}

/// Renders a quantity as provided: whole values without a decimal point,
/// fractional ones (hours) with their fraction.
pub fn format_quantity(quantity: f64) -> String {
    format!("{}", quantity)
}

/// Renders one PDF for a selection of persisted jobs.
pub struct InvoiceRenderer {
    company: CompanyInfo,
}

impl Default for InvoiceRenderer {
    fn default() -> Self {
        Self::new(CompanyInfo::default())
    }
}

impl InvoiceRenderer {
    pub fn new(company: CompanyInfo) -> Self {
        Self { company }
    }

    /// Renders the given jobs, in input order, into one document.
    ///
    /// Line totals are recomputed from price × quantity; the total row
    /// shows the stored amount, and a disagreement beyond rounding is
    /// logged as a data-integrity warning rather than reconciled.
    pub fn render(&self, jobs: &[(Job, Vec<JobItem>)]) -> Result<Vec<u8>, RenderError> {
        if jobs.is_empty() {
            return Err(RenderError::EmptySelection);
        }

        let _span = tracing::info_span!("invoice.render", jobs = jobs.len()).entered();

        let mut builder = PdfBuilder::new();
        for (job, items) in jobs {
            self.render_job(&mut builder, job, items);
        }

        let bytes = builder.finish()?;
        log::info!(
            "Rendered invoice document for {} job(s), {} bytes",
            jobs.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn render_job(&self, builder: &mut PdfBuilder, job: &Job, items: &[JobItem]) {
        let mut page = PageContent::new();
        let mut y = TOP;

        // Letterhead.
        page.text(Font::Bold, 16.0, MARGIN, y, &self.company.name);
        y -= 18.0;
        page.text(Font::Regular, BODY_SIZE, MARGIN, y, &self.company.address);
        y -= 14.0;
        page.text(Font::Regular, BODY_SIZE, MARGIN, y, &self.company.phone);
        y -= 28.0;

        // Client block.
        page.text(Font::Bold, BODY_SIZE, MARGIN, y, "Bill To:");
        y -= 14.0;
        page.text(Font::Regular, BODY_SIZE, MARGIN, y, &job.client_name);
        y -= 14.0;
        for line in job.client_address.lines() {
            page.text(Font::Regular, BODY_SIZE, MARGIN, y, line);
            y -= 14.0;
        }
        y -= 8.0;

        page.text(
            Font::Regular,
            BODY_SIZE,
            MARGIN,
            y,
            &format!("Invoice #: {}", job.job_id),
        );
        y -= 14.0;
        page.text(
            Font::Regular,
            BODY_SIZE,
            MARGIN,
            y,
            &format!("Date: {}", job.job_date.format("%Y-%m-%d")),
        );
        y -= 24.0;

        // Item table.
        draw_table_header(&mut page, y);
        y -= ROW_HEIGHT;

        let mut computed_sum = 0.0;
        for item in items {
            let desc_lines = wrap_text(&item.description, DESC_WRAP_CHARS);
            let needed = ROW_HEIGHT.max(desc_lines.len() as f64 * LINE_HEIGHT + 4.0);

            if y - needed < BOTTOM {
                builder.push_page(std::mem::take(&mut page));
                y = TOP;
                draw_table_header(&mut page, y);
                y -= ROW_HEIGHT;
            }

            let line_total = item.line_total();
            computed_sum += line_total;

            for (i, line) in desc_lines.iter().enumerate() {
                page.text(
                    Font::Regular,
                    BODY_SIZE,
                    COL_DESC,
                    y - i as f64 * LINE_HEIGHT,
                    line,
                );
            }
            page.text(
                Font::Regular,
                BODY_SIZE,
                COL_QTY,
                y,
                &format_quantity(item.quantity),
            );
            page.text(Font::Regular, BODY_SIZE, COL_PRICE, y, &format_chf(item.price));
            page.text(Font::Regular, BODY_SIZE, COL_TOTAL, y, &format_chf(line_total));

            y -= needed;
            page.line(TABLE_LEFT, y + 4.0, TABLE_RIGHT, y + 4.0, 0.4);
        }

        if !items.is_empty() && (computed_sum - job.total_amount).abs() > TOTAL_TOLERANCE {
            log::warn!(
                "Job {}: stored total {:.2} disagrees with recomputed item sum {:.2}",
                job.job_id,
                job.total_amount,
                computed_sum
            );
        }

        // Total row, then banking boilerplate. Keep them together on one page.
        if y - 130.0 < BOTTOM {
            builder.push_page(std::mem::take(&mut page));
            y = TOP;
        }

        page.text(Font::Bold, BODY_SIZE, COL_PRICE, y, "Total:");
        page.text(
            Font::Bold,
            BODY_SIZE,
            COL_TOTAL,
            y,
            &format_chf(job.total_amount),
        );
        y -= 30.0;

        page.text(Font::Bold, BODY_SIZE, MARGIN, y, "Bank Details:");
        y -= 14.0;
        for line in [
            format!("Bank: {}", self.company.bank_name),
            format!("IBAN: {}", self.company.iban),
            format!("BIC: {}", self.company.bic),
            format!("MWST-Nr.: {}", self.company.vat_number),
        ] {
            page.text(Font::Regular, BODY_SIZE, MARGIN, y, &line);
            y -= 14.0;
        }

        builder.push_page(page);
    }
}

fn draw_table_header(page: &mut PageContent, y: f64) {
    page.fill_rect(TABLE_LEFT, y - 4.0, TABLE_RIGHT - TABLE_LEFT, ROW_HEIGHT, 0.45);
    page.text_gray(Font::Bold, BODY_SIZE, COL_DESC, y, 1.0, "Description");
    page.text_gray(Font::Bold, BODY_SIZE, COL_QTY, y, 1.0, "Quantity");
    page.text_gray(Font::Bold, BODY_SIZE, COL_PRICE, y, 1.0, "Price");
    page.text_gray(Font::Bold, BODY_SIZE, COL_TOTAL, y, 1.0, "Total");
}

/// Greedy word wrap for the description column.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
