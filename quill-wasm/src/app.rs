use crate::api::ApiClient;
use crate::models::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

pub enum Msg {
    // Auth messages
    UpdateSignupName(String),
    UpdateSignupEmail(String),
    UpdateSignupPassword(String),
    UpdateSigninEmail(String),
    UpdateSigninPassword(String),
    Signup,
    SignupDone(AccountInfo),
    Signin,
    SigninDone(SigninResponse),
    Logout,

    // Blog messages
    UpdateBlogTitle(String),
    UpdateBlogContent(String),
    LoadBlogs,
    BlogsLoaded(BlogsResponse),
    CreateBlog,
    BlogCreated(BlogPost),
    EditBlog(i64),
    UpdateEditForm(i64, String, String),
    SaveBlog(i64),
    BlogUpdated(BlogPost),
    DeleteBlog(i64),
    BlogDeleted(i64),
    CancelEdit,

    // UI messages
    Error(String),
}

#[derive(Clone, PartialEq)]
enum EditState {
    None,
    Editing { id: i64 },
}

pub struct App {
    // Auth state: the cached identity drives rendering only; every request
    // is re-authorized server-side from the token.
    user: Option<AccountInfo>,

    // Forms
    signup_name: String,
    signup_email: String,
    signup_password: String,
    signin_email: String,
    signin_password: String,
    blog_title: String,
    blog_content: String,

    // Blogs
    blogs: Vec<Blog>,
    blogs_count: usize,

    // UI state
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
    edit_state: EditState,
    edit_form_data: Option<(i64, String, String)>,

    // API client
    api: ApiClient,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        // Restore the cached identity, if any, and fetch the feed.
        let user = ApiClient::get_user();
        ctx.link().send_message(Msg::LoadBlogs);

        Self {
            user,
            signup_name: String::new(),
            signup_email: String::new(),
            signup_password: String::new(),
            signin_email: String::new(),
            signin_password: String::new(),
            blog_title: String::new(),
            blog_content: String::new(),
            blogs: Vec::new(),
            blogs_count: 0,
            loading: false,
            error: None,
            notice: None,
            edit_state: EditState::None,
            edit_form_data: None,
            api: ApiClient::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Auth form updates
            Msg::UpdateSignupName(val) => {
                self.signup_name = val;
                true
            }
            Msg::UpdateSignupEmail(val) => {
                self.signup_email = val;
                true
            }
            Msg::UpdateSignupPassword(val) => {
                self.signup_password = val;
                true
            }
            Msg::UpdateSigninEmail(val) => {
                self.signin_email = val;
                true
            }
            Msg::UpdateSigninPassword(val) => {
                self.signin_password = val;
                true
            }

            // Signup
            Msg::Signup => {
                if self.signup_name.is_empty()
                    || self.signup_email.is_empty()
                    || self.signup_password.is_empty()
                {
                    self.error = Some("All fields are required".to_string());
                    return true;
                }

                self.loading = true;
                self.error = None;
                self.notice = None;

                let req = SignupRequest {
                    name: self.signup_name.clone(),
                    email: self.signup_email.clone(),
                    password: self.signup_password.clone(),
                };

                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.signup(&req).await {
                        Ok(response) => link.send_message(Msg::SignupDone(response.user)),
                        Err(e) => link.send_message(Msg::Error(e)),
                    }
                });

                false
            }

            // Signup never signs the user in: the server issues no token at
            // registration, so the signin form is the next stop.
            Msg::SignupDone(account) => {
                self.loading = false;
                self.signin_email = account.email.clone();
                self.signup_name.clear();
                self.signup_email.clear();
                self.signup_password.clear();
                self.notice = Some(format!(
                    "Account created for {}. Please sign in.",
                    account.email
                ));
                true
            }

            // Signin
            Msg::Signin => {
                if self.signin_email.is_empty() || self.signin_password.is_empty() {
                    self.error = Some("Email and password are required".to_string());
                    return true;
                }

                self.loading = true;
                self.error = None;
                self.notice = None;

                let req = SigninRequest {
                    email: self.signin_email.clone(),
                    password: self.signin_password.clone(),
                };

                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.signin(&req).await {
                        Ok(response) => link.send_message(Msg::SigninDone(response)),
                        Err(e) => link.send_message(Msg::Error(e)),
                    }
                });

                false
            }

            Msg::SigninDone(response) => {
                ApiClient::save_credential(&response.token, &response.user);
                self.user = Some(response.user);
                self.loading = false;
                self.signin_email.clear();
                self.signin_password.clear();
                ctx.link().send_message(Msg::LoadBlogs);
                true
            }

            // Logout
            Msg::Logout => {
                ApiClient::clear_credential();
                self.user = None;
                self.signin_email.clear();
                self.signin_password.clear();
                true
            }

            // Blog form updates
            Msg::UpdateBlogTitle(val) => {
                self.blog_title = val;
                true
            }
            Msg::UpdateBlogContent(val) => {
                self.blog_content = val;
                true
            }

            // Load blogs
            Msg::LoadBlogs => {
                self.loading = true;

                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.list_blogs().await {
                        Ok(response) => link.send_message(Msg::BlogsLoaded(response)),
                        Err(e) => link.send_message(Msg::Error(e)),
                    }
                });

                false
            }

            Msg::BlogsLoaded(response) => {
                self.blogs = response.blogs;
                self.blogs_count = response.count;
                self.loading = false;
                true
            }

            // Create blog
            Msg::CreateBlog => {
                if self.blog_title.is_empty() || self.blog_content.is_empty() {
                    self.error = Some("Title and content are required".to_string());
                    return true;
                }

                self.loading = true;
                self.error = None;

                let req = BlogBody {
                    title: self.blog_title.clone(),
                    content: self.blog_content.clone(),
                };

                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.create_blog(&req).await {
                        Ok(blog) => link.send_message(Msg::BlogCreated(blog)),
                        Err(e) => link.send_message(Msg::Error(e)),
                    }
                });

                false
            }

            // Reload the feed so the new entry carries its author fields.
            Msg::BlogCreated(_blog) => {
                self.blog_title.clear();
                self.blog_content.clear();
                self.loading = false;
                ctx.link().send_message(Msg::LoadBlogs);
                true
            }

            // Edit blog - начинаем редактирование
            Msg::EditBlog(id) => {
                if let Some(blog) = self.blogs.iter().find(|b| b.id == id) {
                    self.edit_form_data = Some((id, blog.title.clone(), blog.content.clone()));
                    self.edit_state = EditState::Editing { id };
                }
                true
            }

            // Только локальное обновление формы
            Msg::UpdateEditForm(id, title, content) => {
                self.edit_form_data = Some((id, title, content));
                true
            }

            // Save blog - отправка на сервер
            Msg::SaveBlog(id) => {
                if let Some((_, title, content)) = self.edit_form_data.clone() {
                    self.loading = true;
                    self.error = None;

                    let req = BlogBody { title, content };

                    let api = self.api.clone();
                    let link = ctx.link().clone();

                    spawn_local(async move {
                        match api.update_blog(id, &req).await {
                            Ok(blog) => link.send_message(Msg::BlogUpdated(blog)),
                            Err(e) => link.send_message(Msg::Error(e)),
                        }
                    });
                }
                true
            }

            Msg::BlogUpdated(blog) => {
                if let Some(entry) = self.blogs.iter_mut().find(|b| b.id == blog.id) {
                    entry.title = blog.title;
                    entry.content = blog.content;
                    entry.updated_at = blog.updated_at;
                }
                self.edit_state = EditState::None;
                self.edit_form_data = None;
                self.loading = false;
                true
            }

            // Delete blog
            Msg::DeleteBlog(id) => {
                self.loading = true;

                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.delete_blog(id).await {
                        Ok(()) => link.send_message(Msg::BlogDeleted(id)),
                        Err(e) => link.send_message(Msg::Error(e)),
                    }
                });

                false
            }

            Msg::BlogDeleted(id) => {
                self.blogs.retain(|b| b.id != id);
                self.blogs_count = self.blogs_count.saturating_sub(1);
                self.loading = false;
                true
            }

            // Cancel edit
            Msg::CancelEdit => {
                self.edit_state = EditState::None;
                self.edit_form_data = None;
                true
            }

            // Error
            Msg::Error(e) => {
                self.error = Some(e);
                self.loading = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let is_authenticated = self.user.is_some();

        html! {
            <div class="container">
                <h1>{ "Quill" }</h1>

                // Error display
                { self.view_error() }

                // Notice display
                { self.view_notice() }

                // Loading indicator
                { self.view_loading() }

                // Auth section
                if is_authenticated {
                    { self.view_user_info(ctx) }
                    { self.view_create_blog_form(ctx) }
                } else {
                    { self.view_auth_forms(ctx) }
                }

                // Blogs section
                { self.view_blogs_section(ctx) }
            </div>
        }
    }
}

impl App {
    fn view_error(&self) -> Html {
        match &self.error {
            Some(error) => html! {
                <div class="error">
                    { format!("Error: {}", error) }
                </div>
            },
            None => html! {},
        }
    }

    fn view_notice(&self) -> Html {
        match &self.notice {
            Some(notice) => html! {
                <div class="notice">
                    { notice.clone() }
                </div>
            },
            None => html! {},
        }
    }

    fn view_loading(&self) -> Html {
        if self.loading {
            html! {
                <div class="loading"> { "Loading..." } </div>
            }
        } else {
            html! {}
        }
    }

    fn view_user_info(&self, ctx: &Context<Self>) -> Html {
        match &self.user {
            Some(user) => {
                let role = match user.role {
                    Role::Admin => "admin",
                    Role::User => "user",
                };
                html! {
                    <div class="user-info">
                        <span>{ format!("Signed in as: {} ({}, {})", user.name, user.email, role) }</span>
                        <button onclick={ctx.link().callback(|_| Msg::Logout)}>
                            { "Sign out" }
                        </button>
                    </div>
                }
            }
            None => html! {},
        }
    }

    fn view_auth_forms(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="auth-forms">
                <div class="signup-form">
                    <h3>{ "Sign up" }</h3>
                    <input
                        type="text"
                        placeholder="Name"
                        value={self.signup_name.clone()}
                        oninput={ctx.link().callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::UpdateSignupName(input.value())
                        })}
                    />
                    <input
                        type="email"
                        placeholder="Email"
                        value={self.signup_email.clone()}
                        oninput={ctx.link().callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::UpdateSignupEmail(input.value())
                        })}
                    />
                    <input
                        type="password"
                        placeholder="Password (min 6 characters)"
                        value={self.signup_password.clone()}
                        oninput={ctx.link().callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::UpdateSignupPassword(input.value())
                        })}
                    />
                    <button onclick={ctx.link().callback(|_| Msg::Signup)}>
                        { "Sign up" }
                    </button>
                </div>

                <div class="signin-form">
                    <h3>{ "Sign in" }</h3>
                    <input
                        type="email"
                        placeholder="Email"
                        value={self.signin_email.clone()}
                        oninput={ctx.link().callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::UpdateSigninEmail(input.value())
                        })}
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        value={self.signin_password.clone()}
                        oninput={ctx.link().callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::UpdateSigninPassword(input.value())
                        })}
                    />
                    <button onclick={ctx.link().callback(|_| Msg::Signin)}>
                        { "Sign in" }
                    </button>
                </div>
            </div>
        }
    }

    fn view_create_blog_form(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="create-blog">
                <h3>{ "Create New Blog" }</h3>
                <input
                    type="text"
                    placeholder="Title"
                    value={self.blog_title.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::UpdateBlogTitle(input.value())
                    })}
                />
                <textarea
                    placeholder="Content"
                    value={self.blog_content.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| {
                        let input: HtmlTextAreaElement = e.target_unchecked_into();
                        Msg::UpdateBlogContent(input.value())
                    })}
                />
                <button onclick={ctx.link().callback(|_| Msg::CreateBlog)}>
                    { "Publish" }
                </button>
            </div>
        }
    }

    fn view_blogs_section(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="blogs-section">
                <h2>{ format!("Blogs ({})", self.blogs_count) }</h2>
                <button onclick={ctx.link().callback(|_| Msg::LoadBlogs)}>
                    { "Refresh" }
                </button>

                <div class="blogs-list">
                    { for self.blogs.iter().map(|blog| self.view_blog(blog, ctx)) }
                </div>

                if self.blogs.is_empty() && !self.loading {
                    <p>{ "No blogs yet. Be the first to create one!" }</p>
                }
            </div>
        }
    }

    fn view_blog(&self, blog: &Blog, ctx: &Context<Self>) -> Html {
        // Advisory rendering only: the buttons mirror the server's rules
        // (owner or admin edits, only admins delete), but the server decides
        // for real on every request.
        let can_edit = self
            .user
            .as_ref()
            .map(|u| u.can_edit(blog.account_id))
            .unwrap_or(false);
        let can_delete = self.user.as_ref().map(|u| u.can_delete()).unwrap_or(false);

        let blog_id = blog.id;
        let blog_title = blog.title.clone();
        let blog_content = blog.content.clone();
        let author_name = blog.author_name.clone();
        let created_at = blog.created_at.clone();

        match &self.edit_state {
            EditState::Editing { id } if *id == blog_id => {
                self.view_edit_form(blog_id, blog_title, blog_content, ctx)
            }
            _ => {
                let edit_callback = ctx.link().callback(move |_| Msg::EditBlog(blog_id));
                let delete_callback = ctx.link().callback(move |_| Msg::DeleteBlog(blog_id));

                html! {
                    <div class="blog" key={blog_id}>
                        <h3>{ &blog_title }</h3>
                        <p>{ &blog_content }</p>
                        <small>
                            { format!("By {} at {}", author_name, created_at) }
                        </small>

                        if can_edit || can_delete {
                            <div class="blog-actions">
                                if can_edit {
                                    <button onclick={edit_callback}>
                                        { "Edit" }
                                    </button>
                                }
                                if can_delete {
                                    <button onclick={delete_callback}>
                                        { "Delete" }
                                    </button>
                                }
                            </div>
                        }
                    </div>
                }
            }
        }
    }

    fn view_edit_form(&self, id: i64, title: String, content: String, ctx: &Context<Self>) -> Html {
        // Используем локальное состояние если есть
        let (current_title, current_content) = match &self.edit_form_data {
            Some((form_id, form_title, form_content)) if *form_id == id => {
                (form_title.clone(), form_content.clone())
            }
            _ => (title, content),
        };

        // Обработчик для поля заголовка
        let title_handle = {
            let content = current_content.clone();
            ctx.link().callback(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                Msg::UpdateEditForm(id, input.value(), content.clone())
            })
        };

        // Обработчик для поля содержания
        let content_handle = {
            let title = current_title.clone();
            ctx.link().callback(move |e: InputEvent| {
                let input: HtmlTextAreaElement = e.target_unchecked_into();
                Msg::UpdateEditForm(id, title.clone(), input.value())
            })
        };

        let save_handle = ctx.link().callback(move |_| Msg::SaveBlog(id));
        let cancel_handle = ctx.link().callback(|_| Msg::CancelEdit);

        html! {
            <div class="edit-form">
                <h3>{ "Edit Blog" }</h3>
                <input
                    type="text"
                    value={current_title}
                    oninput={title_handle}
                />
                <textarea
                    value={current_content}
                    oninput={content_handle}
                />
                <div class="edit-actions">
                    <button onclick={save_handle}>
                        { "Save" }
                    </button>
                    <button onclick={cancel_handle}>
                        { "Cancel" }
                    </button>
                </div>
            </div>
        }
    }
}
