// Modal form state: field editing and submission.
//
// A form turns into a `UserCommand` only after it validates. It stays open
// while the request is in flight and closes when the orchestrator answers
// with `UiUpdate::FormAccepted` for its kind.

use std::path::PathBuf;

use buildbidz_app::forms::{self, JobInput, RegisterInput, SalesmanBidInput};
use buildbidz_app::protocol::{FormKind, UserCommand};
use buildbidz_core::model::{ProfileUpdate, User};
use buildbidz_core::upload::FileSelection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    /// Rendered as asterisks.
    pub secret: bool,
}

impl Field {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: true,
        }
    }

    fn with(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

const ATTACHMENTS: &str = "Attachments (comma-separated paths)";

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<String>,
    /// Set once the command is sent; cleared by a failure banner.
    pub submitting: bool,
    /// Job the form acts on (bids, messages).
    pub job_id: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
            submitting: false,
            job_id: None,
        }
    }

    fn for_job(mut self, job_id: &str) -> Self {
        self.job_id = Some(job_id.to_string());
        self
    }

    // --- constructors -----------------------------------------------------

    pub fn login() -> Self {
        Self::new(
            FormKind::Login,
            vec![Field::text("Email"), Field::secret("Password")],
        )
    }

    pub fn register() -> Self {
        Self::new(
            FormKind::Register,
            vec![
                Field::text("Email"),
                Field::secret("Password"),
                Field::secret("Confirm password"),
                Field::text("Company name"),
                Field::text("Contact phone"),
                Field::text("Role (buyer/supplier)").with("buyer"),
                Field::text("GST number (optional)"),
                Field::text("Address (optional)"),
            ],
        )
    }

    pub fn forgot_password() -> Self {
        Self::new(FormKind::ForgotPassword, vec![Field::text("Email")])
    }

    pub fn reset_password() -> Self {
        Self::new(
            FormKind::ResetPassword,
            vec![
                Field::text("Email"),
                Field::text("Reset code"),
                Field::secret("New password"),
                Field::secret("Confirm new password"),
            ],
        )
    }

    pub fn profile(user: &User) -> Self {
        let current = ProfileUpdate::from_user(user);
        Self::new(
            FormKind::Profile,
            vec![
                Field::text("Company name").with(current.company_name),
                Field::text("Contact phone").with(current.contact_phone),
                Field::text("GST number (optional)").with(current.gst_number.unwrap_or_default()),
                Field::text("Address (optional)").with(current.address.unwrap_or_default()),
            ],
        )
    }

    pub fn change_password() -> Self {
        Self::new(
            FormKind::ChangePassword,
            vec![
                Field::secret("Current password"),
                Field::secret("New password"),
                Field::secret("Confirm new password"),
            ],
        )
    }

    pub fn new_job() -> Self {
        Self::new(
            FormKind::NewJob,
            vec![
                Field::text("Title"),
                Field::text("Category (material/labor/machinery)"),
                Field::text("Description"),
                Field::text("Quantity (optional)"),
                Field::text("Location"),
                Field::text("Delivery timeline"),
                Field::text("Budget range (optional)"),
                Field::text(ATTACHMENTS),
            ],
        )
    }

    pub fn bid(job_id: &str) -> Self {
        Self::new(
            FormKind::Bid,
            vec![
                Field::text("Price quote (₹)"),
                Field::text("Delivery estimate"),
                Field::text("Notes (optional)"),
                Field::text(ATTACHMENTS),
            ],
        )
        .for_job(job_id)
    }

    pub fn salesman_bid(job_id: &str) -> Self {
        Self::new(
            FormKind::SalesmanBid,
            vec![
                Field::text("Price quote (₹)"),
                Field::text("Delivery estimate"),
                Field::text("Notes (optional)"),
                Field::text("Company name"),
                Field::text("Company phone"),
                Field::text("Company email"),
                Field::text("Company GST number (optional)"),
                Field::text("Company address (optional)"),
                Field::text(ATTACHMENTS),
            ],
        )
        .for_job(job_id)
    }

    pub fn message(job_id: &str) -> Self {
        Self::new(
            FormKind::Message,
            vec![Field::text("Message"), Field::text(ATTACHMENTS)],
        )
        .for_job(job_id)
    }

    pub fn payment_confirmation(order_id: Option<&str>) -> Self {
        Self::new(
            FormKind::PaymentConfirmation,
            vec![
                Field::text("Order id").with(order_id.unwrap_or_default()),
                Field::text("Payment id"),
                Field::text("Signature"),
            ],
        )
    }

    // --- editing ----------------------------------------------------------

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Login => "Sign in",
            FormKind::Register => "Create account",
            FormKind::ForgotPassword => "Forgot password",
            FormKind::ResetPassword => "Reset password",
            FormKind::Profile => "Edit profile",
            FormKind::ChangePassword => "Change password",
            FormKind::NewJob => "Post a job",
            FormKind::Bid => "Submit bid",
            FormKind::SalesmanBid => "Submit bid for a company",
            FormKind::Message => "New message",
            FormKind::PaymentConfirmation => "Confirm payment",
        }
    }

    pub fn insert(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn v(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    fn job(&self) -> Result<String, String> {
        self.job_id.clone().ok_or_else(|| "No job selected".to_string())
    }

    // --- submission -------------------------------------------------------

    /// Validate the fields and build the command to send. Nothing is sent
    /// when this fails.
    pub fn submit(&self, max_upload_bytes: u64) -> Result<UserCommand, String> {
        let err = |e: forms::FormError| e.to_string();
        let cmd = match self.kind {
            FormKind::Login => {
                let (email, password) = forms::login(self.v(0), self.v(1)).map_err(err)?;
                UserCommand::Login { email, password }
            }
            FormKind::Register => {
                let input = RegisterInput {
                    email: self.v(0).into(),
                    password: self.v(1).into(),
                    confirm_password: self.v(2).into(),
                    company_name: self.v(3).into(),
                    contact_phone: self.v(4).into(),
                    role: self.v(5).into(),
                    gst_number: self.v(6).into(),
                    address: self.v(7).into(),
                };
                UserCommand::Register(forms::register(&input).map_err(err)?)
            }
            FormKind::ForgotPassword => UserCommand::ForgotPassword {
                email: forms::forgot_password(self.v(0)).map_err(err)?,
            },
            FormKind::ResetPassword => UserCommand::ResetPassword(
                forms::reset_password(self.v(0), self.v(1), self.v(2), self.v(3)).map_err(err)?,
            ),
            FormKind::Profile => UserCommand::UpdateProfile(
                forms::profile(self.v(0), self.v(1), self.v(2), self.v(3)).map_err(err)?,
            ),
            FormKind::ChangePassword => {
                let (current, new) =
                    forms::change_password(self.v(0), self.v(1), self.v(2)).map_err(err)?;
                UserCommand::ChangePassword { current, new }
            }
            FormKind::NewJob => {
                let input = JobInput {
                    title: self.v(0).into(),
                    category: self.v(1).into(),
                    description: self.v(2).into(),
                    quantity: self.v(3).into(),
                    location: self.v(4).into(),
                    delivery_timeline: self.v(5).into(),
                    budget_range: self.v(6).into(),
                };
                let job = forms::new_job(&input).map_err(err)?;
                let attachments = attachments(self.v(7), max_upload_bytes)?;
                UserCommand::CreateJob { job, attachments }
            }
            FormKind::Bid => {
                let bid = forms::bid(self.v(0), self.v(1), self.v(2)).map_err(err)?;
                let attachments = attachments(self.v(3), max_upload_bytes)?;
                UserCommand::SubmitBid {
                    job_id: self.job()?,
                    bid,
                    attachments,
                }
            }
            FormKind::SalesmanBid => {
                let input = SalesmanBidInput {
                    price: self.v(0).into(),
                    delivery_estimate: self.v(1).into(),
                    notes: self.v(2).into(),
                    company_name: self.v(3).into(),
                    company_contact_phone: self.v(4).into(),
                    company_email: self.v(5).into(),
                    company_gst_number: self.v(6).into(),
                    company_address: self.v(7).into(),
                };
                let bid = forms::salesman_bid(&input).map_err(err)?;
                let attachments = attachments(self.v(8), max_upload_bytes)?;
                UserCommand::SubmitSalesmanBid {
                    job_id: self.job()?,
                    bid,
                    attachments,
                }
            }
            FormKind::Message => {
                let attachments = attachments(self.v(1), max_upload_bytes)?;
                let text = forms::message(self.v(0), !attachments.is_empty()).map_err(err)?;
                UserCommand::SendMessage {
                    job_id: self.job()?,
                    text,
                    attachments,
                }
            }
            FormKind::PaymentConfirmation => UserCommand::VerifySubscription(
                forms::payment_confirmation(self.v(0), self.v(1), self.v(2)).map_err(err)?,
            ),
        };
        Ok(cmd)
    }
}

/// Parse and validate the attachment field. Every rejected file is listed.
fn attachments(raw: &str, max_upload_bytes: u64) -> Result<Vec<PathBuf>, String> {
    let paths: Vec<PathBuf> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let mut selection = FileSelection::new(max_upload_bytes);
    let rejected = selection.add_paths(&paths);
    if !rejected.is_empty() {
        let messages: Vec<String> = rejected.iter().map(ToString::to_string).collect();
        return Err(messages.join("; "));
    }
    Ok(selection.paths())
}
