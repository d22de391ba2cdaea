mod accounts;
mod catalog;
mod fetch;
mod model;
mod reviews;
mod session;
mod store;
mod watchlist;

use accounts::{AccountStore, RemoveOutcome};
use catalog::{CatalogGateway, GatewayError};
use fetch::FetchQueue;
use log::warn;
use model::{MovieSummary, Review, WatchlistEntry};
use reviews::ReviewStore;
use session::{Navigator, Screen};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use watchlist::{AddOutcome, WatchlistStore};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

struct App {
    accounts: AccountStore,
    reviews: ReviewStore,
    watchlists: WatchlistStore,
    gateway: Option<Arc<CatalogGateway>>,
    nav: Navigator,
    searches: FetchQueue<Result<Vec<MovieSummary>, GatewayError>>,
    genre_map: HashMap<u32, String>,
    genre_filter: Option<String>,
    results: Vec<MovieSummary>,
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_owned()),
        Err(_) => None,
    }
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "movie_explorer=info");
    }
    env_logger::init();

    let data_dir = store::DataDir::from_env();
    if let Err(err) = data_dir.ensure_store_files() {
        warn!("could not prepare data files: {}", err);
    }

    let gateway = match std::env::var("TMDB_API_KEY") {
        Ok(key) => match CatalogGateway::new(key) {
            Ok(gateway) => Some(Arc::new(gateway)),
            Err(err) => {
                warn!("could not build catalog client: {}", err);
                None
            }
        },
        Err(_) => {
            println!("TMDB_API_KEY is not set; catalog browsing is disabled.");
            None
        }
    };

    let mut app = App {
        accounts: AccountStore::open(&data_dir),
        reviews: ReviewStore::open(&data_dir),
        watchlists: WatchlistStore::new(data_dir),
        gateway,
        nav: Navigator::new(),
        searches: FetchQueue::new(),
        genre_map: HashMap::new(),
        genre_filter: None,
        results: Vec::new(),
    };
    app.run();
}

impl App {
    fn run(&mut self) {
        println!("Welcome to Movie Explorer!");
        loop {
            let keep_going = match self.nav.screen() {
                Screen::Welcome => self.welcome_screen(),
                Screen::Login => self.login_screen(),
                Screen::Signup => self.signup_screen(),
                Screen::AdminLogin => self.admin_login_screen(),
                Screen::MainApp => self.main_screen(),
                Screen::Profile => self.profile_screen(),
                Screen::AdminPanel => self.admin_panel_screen(),
                Screen::AdminProfile => self.admin_profile_screen(),
            };
            if !keep_going {
                break;
            }
        }
        println!("Bye!");
    }

    fn welcome_screen(&mut self) -> bool {
        println!();
        println!("[1] Login  [2] Sign up  [3] Continue as guest  [4] Admin login  [q] Quit");
        let Some(choice) = prompt("> ") else { return false };
        let result = match choice.as_str() {
            "1" => self.nav.to_login(),
            "2" => self.nav.to_signup(),
            "3" => {
                let entered = self.nav.browse_as_guest();
                if entered.is_ok() {
                    self.enter_main_view();
                }
                entered
            }
            "4" => self.nav.to_admin_login(),
            "q" => return false,
            _ => {
                println!("Unknown choice.");
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!("{}", err);
        }
        true
    }

    fn login_screen(&mut self) -> bool {
        println!("-- Login (empty username goes back) --");
        let Some(username) = prompt("Username: ") else { return false };
        if username.is_empty() {
            let _ = self.nav.back_to_welcome();
            return true;
        }
        let Some(password) = prompt("Password: ") else { return false };
        match self.nav.login(&self.accounts, &username, &password) {
            Ok(true) => {
                println!("Login successful! Welcome, {}!", username);
                self.enter_main_view();
            }
            Ok(false) => println!("Invalid username or password."),
            Err(err) => warn!("{}", err),
        }
        true
    }

    fn signup_screen(&mut self) -> bool {
        println!("-- Sign up (empty username goes back) --");
        let Some(username) = prompt("Username: ") else { return false };
        if username.is_empty() {
            let _ = self.nav.back_to_welcome();
            return true;
        }
        let Some(password) = prompt("Password: ") else { return false };
        let Some(confirm) = prompt("Confirm password: ") else { return false };
        if password.is_empty() || confirm.is_empty() {
            println!("All fields are required.");
            return true;
        }
        if password != confirm {
            println!("Passwords do not match.");
            return true;
        }
        if self.accounts.register(&username, &password) {
            println!("Registration successful! You can now log in.");
            let _ = self.nav.signup_complete();
        } else {
            println!("Username already exists.");
        }
        true
    }

    fn admin_login_screen(&mut self) -> bool {
        println!("-- Admin login (empty username goes back) --");
        let Some(username) = prompt("Username: ") else { return false };
        if username.is_empty() {
            let _ = self.nav.back_to_welcome();
            return true;
        }
        let Some(password) = prompt("Password: ") else { return false };
        match self.nav.admin_login(&self.accounts, &username, &password) {
            Ok(true) => println!("Admin login successful!"),
            Ok(false) => println!("Invalid admin credentials."),
            Err(err) => warn!("{}", err),
        }
        true
    }

    /// Loads what the main view needs: the genre map for filtering and the
    /// identity's watchlist file (created lazily on first mutation).
    fn enter_main_view(&mut self) {
        self.results.clear();
        self.genre_filter = None;
        if self.genre_map.is_empty() {
            if let Some(gateway) = &self.gateway {
                match gateway.genres() {
                    Ok(map) => self.genre_map = map,
                    Err(err) => println!("Error loading genres: {}", err),
                }
            }
        }
    }

    fn main_screen(&mut self) -> bool {
        match self.nav.current_user() {
            Some(name) => println!("\n[{}] search | random | genres | genre <name|all> | results | add/trailer/reviews/review <n> | watchlist | remove <n> | clear | profile | logout | quit", name),
            None => println!("\n[guest] search | random | genres | genre <name|all> | results | add/trailer/reviews <n> | watchlist | remove <n> | clear | logout | quit"),
        }
        let Some(line) = prompt("> ") else { return false };
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "search" => self.do_search(arg),
            "random" => self.do_random(),
            "genres" => {
                let mut names: Vec<&str> = self.genre_map.values().map(String::as_str).collect();
                names.sort_unstable();
                println!("All Genres, {}", names.join(", "));
            }
            "genre" => {
                if arg.is_empty() || arg.eq_ignore_ascii_case("all") {
                    self.genre_filter = None;
                    println!("Genre filter cleared.");
                } else {
                    self.genre_filter = Some(arg.to_owned());
                    println!("Filtering by genre: {}", arg);
                }
            }
            "results" => self.show_results(),
            "add" => self.do_watchlist_add(arg),
            "trailer" => self.do_trailer(arg),
            "reviews" => self.do_show_reviews(arg),
            "review" => self.do_review(arg),
            "watchlist" => self.show_watchlist(),
            "remove" => self.do_watchlist_remove(arg),
            "clear" => {
                self.watchlists.clear(&self.nav.identity());
                println!("Watchlist cleared.");
            }
            "profile" => {
                if self.nav.current_user().is_some() {
                    let _ = self.nav.open_profile();
                } else {
                    println!("You must be logged in to manage a profile.");
                }
            }
            "logout" => {
                let _ = self.nav.logout();
            }
            "quit" => return false,
            _ => println!("Unknown command."),
        }
        true
    }

    fn do_search(&mut self, query: &str) {
        if query.is_empty() {
            println!("Usage: search <title>");
            return;
        }
        let Some(gateway) = self.gateway.clone() else {
            println!("Catalog browsing is disabled.");
            return;
        };
        let query = query.to_owned();
        // Dispatched off-thread; only the most recently issued search may
        // update the result view.
        self.searches.dispatch(move || gateway.search(&query));
        match self.searches.recv_latest(SEARCH_TIMEOUT) {
            Some(Ok(results)) => {
                self.results = results;
                self.show_results();
            }
            Some(Err(err)) => println!("Error fetching movies: {}", err),
            None => println!("Search timed out."),
        }
    }

    fn do_random(&mut self) {
        let Some(gateway) = &self.gateway else {
            println!("Catalog browsing is disabled.");
            return;
        };
        match gateway.random_movie() {
            Ok(Some(movie)) => {
                self.results = vec![movie];
                self.show_results();
            }
            Ok(None) => println!("No random movie found."),
            Err(err) => println!("Error fetching random movie: {}", err),
        }
    }

    /// Renders the current results, skipping posterless entries and applying
    /// the genre filter, the way the original result panel does.
    fn show_results(&self) {
        let visible: Vec<(usize, &MovieSummary)> = self
            .results
            .iter()
            .filter(|m| m.poster_path.is_some())
            .filter(|m| {
                catalog::matches_genre(m, &self.genre_map, self.genre_filter.as_deref())
            })
            .enumerate()
            .collect();
        if visible.is_empty() {
            println!("No movies found.");
            return;
        }
        for (index, movie) in visible {
            println!("{}. {} (id {})", index + 1, movie.title, movie.id);
            if let Some(path) = &movie.poster_path {
                println!("   poster: {}", catalog::poster_url(path));
            }
            if let Some(overview) = &movie.overview {
                println!("   {}", overview);
            }
            for review in self.reviews.list_for_movie(movie.id) {
                println!("   {} rated {}/5: {}", review.username, review.rating, review.text);
            }
        }
    }

    fn visible_result(&self, arg: &str) -> Option<&MovieSummary> {
        let index: usize = arg.parse().ok()?;
        self.results
            .iter()
            .filter(|m| m.poster_path.is_some())
            .filter(|m| {
                catalog::matches_genre(m, &self.genre_map, self.genre_filter.as_deref())
            })
            .nth(index.checked_sub(1)?)
    }

    fn do_watchlist_add(&mut self, arg: &str) {
        let Some(movie) = self.visible_result(arg) else {
            println!("No such result.");
            return;
        };
        let entry = WatchlistEntry {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_url: movie
                .poster_path
                .as_deref()
                .map(catalog::poster_url)
                .unwrap_or_default(),
        };
        let title = entry.title.clone();
        match self.watchlists.add(&self.nav.identity(), entry) {
            AddOutcome::Accepted => println!("{} added to watchlist.", title),
            AddOutcome::Duplicate => println!("Movie is already in your watchlist."),
        }
    }

    fn show_watchlist(&self) {
        let entries = self.watchlists.load(&self.nav.identity());
        if entries.is_empty() {
            println!("Watchlist is empty.");
            return;
        }
        for (index, entry) in entries.iter().enumerate() {
            println!("{}. {} (id {})", index + 1, entry.title, entry.movie_id);
        }
    }

    fn do_watchlist_remove(&mut self, arg: &str) {
        let Some(index) = arg.parse::<usize>().ok().and_then(|i| i.checked_sub(1)) else {
            println!("Usage: remove <watchlist number>");
            return;
        };
        match self.watchlists.remove(&self.nav.identity(), index) {
            Some(entry) => println!("{} removed from watchlist.", entry.title),
            None => println!("No such watchlist entry."),
        }
    }

    fn do_trailer(&mut self, arg: &str) {
        let Some(movie) = self.visible_result(arg) else {
            println!("No such result.");
            return;
        };
        let Some(gateway) = &self.gateway else {
            println!("Catalog browsing is disabled.");
            return;
        };
        match gateway.trailer_url(movie.id) {
            Ok(Some(url)) => println!("Trailer: {}", url),
            Ok(None) => println!("Trailer not available for this movie."),
            Err(err) => println!("Error opening trailer: {}", err),
        }
    }

    fn do_show_reviews(&self, arg: &str) {
        let Some(movie) = self.visible_result(arg) else {
            println!("No such result.");
            return;
        };
        let reviews = self.reviews.list_for_movie(movie.id);
        if reviews.is_empty() {
            println!("No reviews for {} yet.", movie.title);
            return;
        }
        for review in reviews {
            println!("{} rated {}/5: {}", review.username, review.rating, review.text);
        }
    }

    fn do_review(&mut self, arg: &str) {
        let Some(username) = self.nav.current_user().map(str::to_owned) else {
            println!("You must be logged in to rate and review movies.");
            return;
        };
        let Some(movie) = self.visible_result(arg) else {
            println!("No such result.");
            return;
        };
        let movie_id = movie.id;
        let Some(rating) = read_rating() else { return };
        let Some(text) = prompt("Your review: ") else { return };
        if text.is_empty() {
            println!("Review text cannot be empty.");
            return;
        }
        self.reviews.add(Review::new(movie_id, &username, rating, &text));
        println!("Review submitted successfully!");
    }

    fn profile_screen(&mut self) -> bool {
        let username = match self.nav.current_user() {
            Some(name) => name.to_owned(),
            None => {
                let _ = self.nav.back_to_main();
                return true;
            }
        };
        println!("-- Profile for {} (empty password goes back) --", username);
        let Some(new_password) = prompt("New password: ") else { return false };
        if new_password.is_empty() {
            let _ = self.nav.back_to_main();
            return true;
        }
        let Some(confirm) = prompt("Confirm new password: ") else { return false };
        if confirm.is_empty() {
            println!("New password fields cannot be empty.");
            return true;
        }
        if new_password != confirm {
            println!("New passwords do not match.");
            return true;
        }
        if self.accounts.update_password(&username, &new_password) {
            println!("Password updated successfully!");
        } else {
            println!("Failed to update password.");
        }
        true
    }

    fn admin_panel_screen(&mut self) -> bool {
        println!("\n[admin] users | adduser | passwd <user> | deluser <user> | adminpass | reviews | editreview <n> | delreview <n> | back | quit");
        let Some(line) = prompt("> ") else { return false };
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "users" => {
                for account in self.accounts.list_all() {
                    println!("{}  (password: {})", account.username, account.password);
                }
            }
            "adduser" => self.admin_add_user(),
            "passwd" => self.admin_change_password(arg),
            "deluser" => match self.accounts.delete(arg) {
                RemoveOutcome::Removed => println!("User {} deleted successfully.", arg),
                RemoveOutcome::Refused => println!("Cannot delete the admin user."),
                RemoveOutcome::NotFound => println!("No such user: {}", arg),
            },
            "adminpass" => {
                let _ = self.nav.open_admin_profile();
            }
            "reviews" => {
                for (index, review) in self.reviews.list_all().iter().enumerate() {
                    println!(
                        "{}. movie {} | {} | {}/5 | {} | {}",
                        index + 1,
                        review.movie_id,
                        review.username,
                        review.rating,
                        review.text,
                        review.created_at
                    );
                }
            }
            "editreview" => self.admin_edit_review(arg),
            "delreview" => self.admin_delete_review(arg),
            "back" => {
                let _ = self.nav.back_to_welcome();
            }
            "quit" => return false,
            _ => println!("Unknown command."),
        }
        true
    }

    fn admin_add_user(&mut self) {
        let Some(username) = prompt("Username: ") else { return };
        let Some(password) = prompt("Password: ") else { return };
        if username.is_empty() || password.is_empty() {
            println!("Username and password cannot be empty.");
            return;
        }
        if self.accounts.register(&username, &password) {
            println!("User added successfully.");
        } else {
            println!("Username already exists.");
        }
    }

    fn admin_change_password(&mut self, username: &str) {
        if username.is_empty() {
            println!("Usage: passwd <user>");
            return;
        }
        let Some(new_password) = prompt("New password: ") else { return };
        let Some(confirm) = prompt("Confirm new password: ") else { return };
        if new_password.is_empty() || confirm.is_empty() {
            println!("New password fields cannot be empty.");
            return;
        }
        if new_password != confirm {
            println!("Passwords do not match.");
            return;
        }
        if self.accounts.update_password(username, &new_password) {
            println!("Password updated successfully.");
        } else {
            println!("Failed to update password for {}", username);
        }
    }

    fn nth_review(&self, arg: &str) -> Option<Review> {
        let index: usize = arg.parse().ok()?;
        self.reviews
            .list_all()
            .get(index.checked_sub(1)?)
            .map(|review| (*review).clone())
    }

    fn admin_edit_review(&mut self, arg: &str) {
        let Some(review) = self.nth_review(arg) else {
            println!("No such review.");
            return;
        };
        let Some(rating) = read_rating() else { return };
        let Some(text) = prompt("New review text: ") else { return };
        if text.is_empty() {
            println!("Review text cannot be empty.");
            return;
        }
        if self
            .reviews
            .update(review.movie_id, &review.username, review.created_at, rating, &text)
        {
            println!("Review updated successfully.");
        } else {
            println!("Failed to update review.");
        }
    }

    fn admin_delete_review(&mut self, arg: &str) {
        let Some(review) = self.nth_review(arg) else {
            println!("No such review.");
            return;
        };
        if self
            .reviews
            .delete(review.movie_id, &review.username, review.created_at)
        {
            println!("Review deleted successfully.");
        } else {
            println!("Failed to delete review.");
        }
    }

    fn admin_profile_screen(&mut self) -> bool {
        println!("-- Change admin password (empty goes back) --");
        let Some(new_password) = prompt("New password: ") else { return false };
        if new_password.is_empty() {
            let _ = self.nav.back_to_admin_panel();
            return true;
        }
        let Some(confirm) = prompt("Confirm new password: ") else { return false };
        if confirm.is_empty() {
            println!("New password fields cannot be empty.");
            return true;
        }
        if new_password != confirm {
            println!("New passwords do not match.");
            return true;
        }
        if self.accounts.update_admin_password(&new_password) {
            println!("Admin password updated successfully!");
        } else {
            println!("Failed to update admin password.");
        }
        true
    }
}

fn read_rating() -> Option<u8> {
    let input = prompt("Rating (1-5): ")?;
    match input.parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => Some(rating),
        _ => {
            println!("Rating must be a number from 1 to 5.");
            None
        }
    }
}
